use crate::domain::{AttendanceError, StorageError};
use crate::dto::ErrorResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Error returned by every API handler.
///
/// Maps the domain taxonomy onto HTTP status codes. Internal failures are
/// logged with full detail and reported to the caller generically.
#[derive(Debug)]
pub struct ApiError(pub AttendanceError);

impl From<AttendanceError> for ApiError {
    fn from(err: AttendanceError) -> Self {
        ApiError(err)
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        ApiError(AttendanceError::Storage(err))
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError(AttendanceError::Internal(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // ---
        let (status, error, kind) = match &self.0 {
            AttendanceError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "Unauthorized".to_string(), None)
            }
            AttendanceError::InvalidFaceData(_)
            | AttendanceError::DuplicateAttendance
            | AttendanceError::InvalidRequest(_) => {
                (StatusCode::BAD_REQUEST, capitalize(&self.0.to_string()), None)
            }
            AttendanceError::Forbidden(_) => {
                (StatusCode::FORBIDDEN, capitalize(&self.0.to_string()), None)
            }
            AttendanceError::PhotoNotFound => {
                (StatusCode::NOT_FOUND, "Photo not found".to_string(), None)
            }
            AttendanceError::Storage(e) => (
                StatusCode::BAD_GATEWAY,
                e.public_message().to_string(),
                Some(e.kind().to_string()),
            ),
            AttendanceError::Internal(e) => {
                tracing::error!("Internal error: {e:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        if status != StatusCode::INTERNAL_SERVER_ERROR {
            tracing::warn!(status = status.as_u16(), "Request rejected: {}", self.0);
        }

        (status, Json(ErrorResponse { error, kind })).into_response()
    }
}

fn capitalize(message: &str) -> String {
    // ---
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
