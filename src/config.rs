// src/config.rs

//! Application configuration loaded from environment variables.
//!
//! This module defines all startup-time configuration for the service.
//! Configuration is validated eagerly and failures are treated as
//! deployment errors rather than recoverable runtime conditions.

use anyhow::{anyhow, Result};
use chrono::NaiveTime;
use std::time::Duration;

// ============================================================
// Local macros (config-only, intentionally explicit)
// ============================================================

/// Reads a required environment variable.
///
/// # Behavior
/// - Fails fast if the variable is missing
/// - Produces a clear, human-readable error message
/// - Intended for startup-time configuration validation
///
/// Missing configuration is treated as a deployment error,
/// not a recoverable runtime condition.
macro_rules! required_env {
    // ---
    ($key:literal) => {
        std::env::var($key)
            .map_err(|_| anyhow::anyhow!(concat!("Missing required configuration: ", $key)))?
    };
}

/// Reads an optional environment variable and attempts to parse it.
///
/// If the variable is missing or cannot be parsed, the provided
/// default value is used. This macro is appropriate for non-critical
/// tuning parameters where fallback behavior is acceptable.
macro_rules! optional_env_parse {
    // ---
    ($key:literal, $ty:ty, $default:expr) => {
        std::env::var($key)
            .ok()
            .and_then(|v| v.parse::<$ty>().ok())
            .unwrap_or($default)
    };
}

#[cfg(test)]
/// Asserts that a configuration constructor fails due to a missing
/// required environment variable.
///
/// This macro is intended for config unit tests only and enforces
/// consistent error messages across failure cases.
macro_rules! assert_missing_config {
    // ---
    ($expr:expr, $key:literal) => {{
        let err = $expr.expect_err("expected configuration error");
        assert!(
            err.to_string()
                .contains(concat!("Missing required configuration: ", $key)),
            "unexpected error: {err}"
        );
    }};
}

// ============================================================
// Public configuration facade
// ============================================================

/// Aggregated application configuration.
///
/// This is the single source of truth for startup configuration.
/// All required configuration is validated eagerly during initialization.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: server::ServerConfig,
    pub attendance: attendance::AttendanceConfig,

    /// Present only when the PostgreSQL backend is selected.
    pub database: Option<database::DatabaseConfig>,

    pub redis: redis::RedisConfig,
    pub drive: drive::DriveConfig,
}

impl AppConfig {
    /// Loads and validates all application configuration from the environment.
    ///
    /// # Errors
    /// Returns an error if any required configuration is missing or invalid.
    /// This function is intended to be called exactly once at startup.
    pub fn from_env() -> Result<Self> {
        // ---
        let attendance = attendance::AttendanceConfig::from_env()?;
        let database = match attendance.repository {
            RepositoryKind::Postgres => Some(database::DatabaseConfig::from_env()?),
            RepositoryKind::Memory => None,
        };

        Ok(Self {
            server: server::ServerConfig::from_env()?,
            attendance,
            database,
            redis: redis::RedisConfig::from_env()?,
            drive: drive::DriveConfig::from_env()?,
        })
    }
}

// ============================================================
// Server configuration
// ============================================================

mod server {
    // ---
    use super::*;

    /// Listener and observability settings.
    #[derive(Debug, Clone)]
    pub struct ServerConfig {
        /// Socket address the HTTP server binds to. Defaults to 127.0.0.1:8080.
        pub bind_addr: String,

        /// `prom` for Prometheus metrics, anything else for no-op.
        pub metrics_type: String,
    }

    impl ServerConfig {
        pub fn from_env() -> Result<Self> {
            // ---
            let bind_addr = std::env::var("ATTENDANCE_BIND_ADDR")
                .unwrap_or_else(|_| "127.0.0.1:8080".to_string());
            let metrics_type =
                std::env::var("ATTENDANCE_METRICS_TYPE").unwrap_or_else(|_| "noop".to_string());

            Ok(Self {
                bind_addr,
                metrics_type,
            })
        }

        pub fn prometheus_enabled(&self) -> bool {
            self.metrics_type == "prom"
        }
    }
}
pub use server::ServerConfig;

// ============================================================
// Attendance configuration
// ============================================================

/// Which repository backend stores users and attendance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryKind {
    Postgres,
    Memory,
}

impl std::str::FromStr for RepositoryKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        // ---
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" => Ok(RepositoryKind::Postgres),
            "memory" => Ok(RepositoryKind::Memory),
            other => Err(anyhow!("Unknown ATTENDANCE_REPOSITORY backend: {other}")),
        }
    }
}

/// Parses an `HH:MM` or `HH:MM:SS` wall-clock time.
pub(crate) fn parse_cutoff(value: &str) -> Result<NaiveTime> {
    // ---
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| anyhow!("Invalid ATTENDANCE_ON_TIME_CUTOFF: {value} (expected HH:MM[:SS])"))
}

mod attendance {
    // ---
    use super::*;

    /// Business rules of the attendance pipeline.
    #[derive(Debug, Clone)]
    pub struct AttendanceConfig {
        /// Latest local time that still counts as on time. Defaults to 09:00.
        pub on_time_cutoff: NaiveTime,

        /// Storage backend. Defaults to PostgreSQL.
        pub repository: RepositoryKind,
    }

    impl AttendanceConfig {
        /// Builds an [`AttendanceConfig`] from environment variables.
        ///
        /// # Errors
        /// A malformed cutoff or unknown backend name is rejected rather than
        /// silently replaced by the default.
        pub fn from_env() -> Result<Self> {
            // ---
            let on_time_cutoff = match std::env::var("ATTENDANCE_ON_TIME_CUTOFF") {
                Ok(v) => parse_cutoff(&v)?,
                Err(_) => parse_cutoff("09:00")?,
            };

            let repository = match std::env::var("ATTENDANCE_REPOSITORY") {
                Ok(v) => v.parse()?,
                Err(_) => RepositoryKind::Postgres,
            };

            Ok(Self {
                on_time_cutoff,
                repository,
            })
        }
    }
}
pub use attendance::AttendanceConfig;

// ============================================================
// Database configuration
// ============================================================

mod database {
    // ---
    use super::*;

    /// Database-related configuration derived from environment variables.
    ///
    /// Required whenever the PostgreSQL backend is selected and validated
    /// eagerly during startup.
    #[derive(Debug, Clone)]
    pub struct DatabaseConfig {
        /// PostgreSQL connection string.
        pub database_url: String,

        /// Number of retry attempts when initializing the database connection. Defaults to 50.
        pub retry_count: u32,

        /// Maximum time to wait when acquiring a connection from the pool. Defaults to 30 seconds.
        pub acquire_timeout: Duration,

        /// Minimum number of connections to keep in the pool, even when idle. Defaults to 2.
        pub min_connections: u32,

        /// Maximum number of connections to be open concurrently. Defaults to 15.
        pub max_connections: u32,
    }

    impl DatabaseConfig {
        /// Builds a [`DatabaseConfig`] from environment variables.
        ///
        /// # Errors
        /// Returns an error if required configuration is missing.
        pub fn from_env() -> Result<Self> {
            // ---
            let database_url = required_env!("DATABASE_URL");
            let retry_count = optional_env_parse!("ATTENDANCE_DB_RETRY_COUNT", u32, 50);
            let acquire_timeout_secs =
                optional_env_parse!("ATTENDANCE_DB_ACQUIRE_TIMEOUT_SEC", u64, 30);
            let min_connections = optional_env_parse!("ATTENDANCE_DB_MIN_CONNECTIONS", u32, 2);
            let max_connections = optional_env_parse!("ATTENDANCE_DB_MAX_CONNECTIONS", u32, 15);

            Ok(Self {
                database_url,
                retry_count,
                acquire_timeout: Duration::from_secs(acquire_timeout_secs),
                min_connections,
                max_connections,
            })
        }
    }
}
pub use database::DatabaseConfig;

// ============================================================
// Redis configuration
// ============================================================

mod redis {
    // ---
    use super::*;

    /// Session store configuration.
    ///
    /// Sessions are written by the login collaborator and read here to
    /// resolve bearer tokens.
    #[derive(Debug, Clone)]
    pub struct RedisConfig {
        /// Redis connection string.
        pub url: String,

        /// Lifetime of newly created sessions. Defaults to 7 days.
        pub session_ttl: Duration,
    }

    impl RedisConfig {
        /// Builds a [`RedisConfig`] from environment variables.
        ///
        /// # Errors
        /// Returns an error if required configuration is missing.
        pub fn from_env() -> Result<Self> {
            // ---
            let url = required_env!("ATTENDANCE_REDIS_URL");

            let ttl_secs = optional_env_parse!("ATTENDANCE_SESSION_TTL_SEC", u64, 604_800);

            Ok(Self {
                url,
                session_ttl: Duration::from_secs(ttl_secs),
            })
        }
    }
}
pub use redis::RedisConfig;

// ============================================================
// Google Drive configuration
// ============================================================

mod drive {
    // ---
    use super::*;

    pub const DEFAULT_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
    pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
    pub const DEFAULT_UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3/files";
    pub const DEFAULT_FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
    pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:8080/api/oauth2callback";

    /// Google OAuth client and Drive destination.
    ///
    /// The refresh token is read once here and never re-read while running.
    #[derive(Clone)]
    pub struct DriveConfig {
        pub client_id: String,
        pub client_secret: String,

        /// Long-lived credential. Without it every upload fails as `CredentialRejected`.
        pub refresh_token: Option<String>,

        pub redirect_uri: String,

        /// Parent folder for uploaded photos.
        pub folder_id: Option<String>,

        pub auth_url: String,
        pub token_url: String,
        pub upload_url: String,
        pub files_url: String,
    }

    // Secrets stay out of logs.
    impl std::fmt::Debug for DriveConfig {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("DriveConfig")
                .field("client_id", &self.client_id)
                .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
                .field("redirect_uri", &self.redirect_uri)
                .field("folder_id", &self.folder_id)
                .field("token_url", &self.token_url)
                .field("upload_url", &self.upload_url)
                .finish_non_exhaustive()
        }
    }

    fn non_empty(key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.trim().is_empty())
    }

    impl DriveConfig {
        /// Builds a [`DriveConfig`] from environment variables.
        ///
        /// # Errors
        /// Returns an error if the OAuth client credentials are missing.
        pub fn from_env() -> Result<Self> {
            // ---
            let client_id = required_env!("GOOGLE_CLIENT_ID");
            let client_secret = required_env!("GOOGLE_CLIENT_SECRET");

            Ok(Self {
                client_id,
                client_secret,
                refresh_token: non_empty("GOOGLE_REFRESH_TOKEN"),
                redirect_uri: non_empty("GOOGLE_REDIRECT_URI")
                    .unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string()),
                folder_id: non_empty("GOOGLE_DRIVE_FOLDER_ID"),
                auth_url: non_empty("GOOGLE_OAUTH_AUTH_URL")
                    .unwrap_or_else(|| DEFAULT_AUTH_URL.to_string()),
                token_url: non_empty("GOOGLE_OAUTH_TOKEN_URL")
                    .unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string()),
                upload_url: non_empty("GOOGLE_DRIVE_UPLOAD_URL")
                    .unwrap_or_else(|| DEFAULT_UPLOAD_URL.to_string()),
                files_url: non_empty("GOOGLE_DRIVE_FILES_URL")
                    .unwrap_or_else(|| DEFAULT_FILES_URL.to_string()),
            })
        }
    }
}
pub use drive::DriveConfig;

// ============================================================
// Tests
// ============================================================
