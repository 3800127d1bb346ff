mod postgres_repository;


use postgres_repository::PostgresRepository;

use crate::config::DatabaseConfig;
use crate::domain::RepositoryPtr;
use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

/// Opens a PostgreSQL pool, retrying while the database comes up.
///
/// Containers frequently start the service before PostgreSQL accepts
/// connections, so each failed attempt waits one second before the next.
async fn connect_with_retry(config: &DatabaseConfig) -> Result<PgPool> {
    // ---
    let attempts = config.retry_count.max(1);
    let mut last_error = None;

    for attempt in 1..=attempts {
        // ---
        let result = PgPoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.database_url)
            .await;

        match result {
            Ok(pool) => {
                tracing::info!(attempt, "Connected to PostgreSQL");
                return Ok(pool);
            }
            Err(e) => {
                tracing::warn!(attempt, attempts, "PostgreSQL not ready: {e}");
                last_error = Some(e);
                if attempt < attempts {
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
    }

    Err(anyhow::anyhow!(
        "Unable to connect to PostgreSQL after {attempts} attempts: {}",
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

/// Applies the embedded schema migrations.
async fn run_migrations(pool: &PgPool) -> Result<()> {
    // ---
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("Database migrations applied");
    Ok(())
}

/// Connects, migrates and wraps the pool in a [`RepositoryPtr`].
pub async fn create_postgres_repository(config: &DatabaseConfig) -> Result<RepositoryPtr> {
    // ---
    let pool = connect_with_retry(config).await?;
    run_migrations(&pool).await?;

    Ok(Arc::new(PostgresRepository::new(pool)))
}
