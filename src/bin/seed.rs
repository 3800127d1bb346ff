//! Creates the default admin and user accounts in PostgreSQL.

use anyhow::{Context, Result};
use attendance_capture::{create_postgres_repository, seed_default_users, DatabaseConfig};
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();
    tracing::info!("Seeding database...");

    let config = DatabaseConfig::from_env()?;
    let repository = create_postgres_repository(&config)
        .await
        .context("Failed to open the attendance database")?;

    let admin_password = env::var("SEED_ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string());
    let user_password = env::var("SEED_USER_PASSWORD").unwrap_or_else(|_| "user123".to_string());

    let users = seed_default_users(&repository, &admin_password, &user_password).await?;

    for user in &users {
        tracing::info!("{} ({}) - {}", user.username, user.full_name, user.role);
    }
    tracing::info!("Seeding completed: {} accounts", users.len());

    Ok(())
}
