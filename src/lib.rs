// src/lib.rs
use anyhow::{anyhow, Result};
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use domain::{AttendanceService, ClockPtr, PunctualityPolicy, SystemClock};
use handlers::*;

// Public exports (visible outside this module)
pub mod capture;
pub mod domain;
pub mod dto;

// Internal-only exports (sibling access within this module)
mod app_state;
mod config;
mod handlers;
mod infrastructure;
mod password;
mod seed;
mod session;

// Hoist up only the public symbol(s)
pub use app_state::AppState;
pub use config::*;
pub use password::{hash_password, verify_password};
pub use seed::{seed_default_users, DEFAULT_USERS};
pub use session::{create_redis_session_store, RedisSessionStore};

// Publicly expose the infrastructure creation functions
pub use infrastructure::{
    create_consent_flow, // ---
    create_drive_storage,
    create_memory_repository,
    create_noop_metrics,
    create_postgres_repository,
    create_prom_metrics,
    ConsentFlow,
    GoogleDriveStorage,
    MemoryRepository,
};

/// Largest accepted request body; base64 photos dominate.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Build the HTTP router over an already assembled [`AppState`].
pub fn create_router(state: AppState) -> Router {
    // ---
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .nest(
            "/api",
            Router::new()
                .route("/attendance", post(submit_attendance).get(list_attendance))
                .route("/attendance/photo", post(upload_photo))
                .route("/attendance/{id}/photo", get(view_photo))
                .route("/storage/consent", get(consent_url))
                .route("/oauth2callback", get(oauth_callback)),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            track_http_requests,
        ))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

/// Assemble every production dependency described by `config`.
pub async fn create_app_state(config: &AppConfig) -> Result<AppState> {
    // ---
    let clock: ClockPtr = Arc::new(SystemClock);

    let metrics = if config.server.prometheus_enabled() {
        create_prom_metrics()?
    } else {
        create_noop_metrics()?
    };

    let repository = match config.attendance.repository {
        RepositoryKind::Postgres => {
            let database = config
                .database
                .as_ref()
                .ok_or_else(|| anyhow!("Missing required configuration: DATABASE_URL"))?;
            create_postgres_repository(database).await?
        }
        RepositoryKind::Memory => create_memory_repository(clock.clone()),
    };

    let sessions = create_redis_session_store(&config.redis.url, config.redis.session_ttl)?;
    let storage = create_drive_storage(&config.drive);
    let consent = create_consent_flow(&config.drive);

    let policy = PunctualityPolicy::new(config.attendance.on_time_cutoff);
    tracing::info!("On-time cutoff: {}", policy.cutoff());

    let service = AttendanceService::new(repository, clock, policy, metrics.clone());

    Ok(AppState::new(service, sessions, storage, consent, metrics))
}

/// Build the HTTP router with dependencies determined by configuration.
pub async fn build_router(config: &AppConfig) -> Result<Router> {
    // ---
    let state = create_app_state(config).await?;
    Ok(create_router(state))
}
