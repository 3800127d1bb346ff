use anyhow::Result;
use attendance_capture::{build_router, AppConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    dotenvy::dotenv().ok();

    // Initialize tracing subscriber to log to stdout
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env()?;
    let endpoint = config.server.bind_addr.clone();
    let app = build_router(&config).await?;

    info!("Starting at endpoint:{}", endpoint);
    info!("Starting Attendance Capture API server v{}...", env!("CARGO_PKG_VERSION"));

    let listener = tokio::net::TcpListener::bind(&endpoint).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    // ---
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
