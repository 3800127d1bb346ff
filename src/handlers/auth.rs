use super::shared_types::ApiError;
use crate::app_state::AppState;
use crate::domain::{AttendanceError, SessionInfo};
use axum::http::{header::AUTHORIZATION, HeaderMap};

/// Resolves the caller from an `Authorization: Bearer <token>` header.
///
/// A missing, malformed, unknown or expired token is `Unauthorized`. A
/// session store outage is an internal error, not a rejected caller.
pub(crate) async fn extract_caller(
    headers: &HeaderMap,
    state: &AppState,
) -> Result<SessionInfo, ApiError> {
    // ---
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            tracing::debug!("Missing or malformed Authorization header");
            AttendanceError::Unauthorized
        })?;

    match state.sessions().validate(token).await? {
        Some(info) => Ok(info),
        None => {
            tracing::debug!("Unknown or expired session token");
            Err(AttendanceError::Unauthorized.into())
        }
    }
}
