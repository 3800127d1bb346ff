use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

/// Failures of the attendance pipeline, as seen by API callers.
#[derive(Debug, Error)]
pub enum AttendanceError {
    // ---
    #[error("unauthorized")]
    Unauthorized,

    #[error("invalid face data: {0}")]
    InvalidFaceData(String),

    #[error("attendance has already been recorded today")]
    DuplicateAttendance,

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("photo not found")]
    PhotoNotFound,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

/// Remote storage failures, classified so callers can act without seeing provider internals.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    // ---
    #[error("storage credential rejected")]
    CredentialRejected,

    #[error("storage quota exceeded")]
    QuotaExceeded,

    #[error("storage request failed: {0}")]
    Unknown(String),
}

impl StorageError {
    // ---
    /// Stable machine-readable tag used in API error bodies and metrics labels.
    pub fn kind(&self) -> &'static str {
        // ---
        match self {
            StorageError::CredentialRejected => "credential_rejected",
            StorageError::QuotaExceeded => "quota_exceeded",
            StorageError::Unknown(_) => "unknown",
        }
    }

    /// Client-facing summary. Provider status lines and bodies stay in the logs.
    pub fn public_message(&self) -> &'static str {
        // ---
        match self {
            StorageError::CredentialRejected => "Storage credential rejected",
            StorageError::QuotaExceeded => "Storage quota exceeded",
            StorageError::Unknown(_) => "Storage request failed",
        }
    }
}

/// Outcome of an attendance insert that did not commit.
#[derive(Debug, Error)]
pub enum InsertAttendanceError {
    // ---
    /// The storage-level (user, day) uniqueness constraint rejected the row.
    #[error("attendance for user {user_id} on {day} already exists")]
    AlreadyRecorded { user_id: Uuid, day: NaiveDate },

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}
