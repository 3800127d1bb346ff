//! Storage credential consent handlers.

use super::auth::extract_caller;
use super::shared_types::ApiError;
use crate::app_state::AppState;
use crate::domain::AttendanceError;
use crate::dto::{ConsentCallbackParams, ConsentCallbackResponse, ConsentUrlResponse};
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};

/// GET /api/storage/consent
///
/// Admin only. Returns the Google authorization URL for minting a new refresh token.
pub async fn consent_url(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ConsentUrlResponse>, ApiError> {
    // ---
    let caller = extract_caller(&headers, &state).await?;
    if !caller.role.is_admin() {
        return Err(AttendanceError::Forbidden("storage consent requires an admin".to_string()).into());
    }

    let auth_url = state.consent().authorization_url()?;
    tracing::info!(username = %caller.username, "Storage consent URL issued");

    Ok(Json(ConsentUrlResponse {
        auth_url,
        instructions: "Open this URL in a browser, sign in and grant access. Google redirects to \
                       /api/oauth2callback, which returns the refresh token to store as \
                       GOOGLE_REFRESH_TOKEN."
            .to_string(),
    }))
}

/// GET /api/oauth2callback?code=
///
/// Browser redirect target; carries no bearer token.
pub async fn oauth_callback(
    State(state): State<AppState>,
    Query(params): Query<ConsentCallbackParams>,
) -> Result<Json<ConsentCallbackResponse>, ApiError> {
    // ---
    if let Some(error) = params.error {
        return Err(AttendanceError::InvalidRequest(format!("consent was not granted: {error}")).into());
    }

    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AttendanceError::InvalidRequest("no code provided".to_string()))?;

    let tokens = state.consent().exchange_code(&code).await?;

    Ok(Json(ConsentCallbackResponse {
        success: true,
        refresh_token: tokens.refresh_token,
        access_token: tokens.access_token,
        expires_in: tokens.expires_in,
    }))
}
