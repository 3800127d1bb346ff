//! Attendance ingestion and history handlers.

use super::auth::extract_caller;
use super::shared_types::ApiError;
use crate::app_state::AppState;
use crate::domain::claim::{check_photo_reference, FaceClaim, FaceDescriptor, FaceSample};
use crate::domain::{AttendanceEntry, AttendanceError, HistoryQuery, SessionInfo};
use crate::dto::{
    AttendanceReceipt, HistoryParams, SubmitAttendanceRequest, SubmitAttendanceResponse,
};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::HeaderMap,
    Json,
};
use uuid::Uuid;

/// Turns the wire payload into a validated claim.
fn claim_from_request(req: SubmitAttendanceRequest) -> Result<FaceClaim, AttendanceError> {
    // ---
    let face = req
        .face_data
        .ok_or_else(|| AttendanceError::InvalidFaceData("no face was detected".to_string()))?;

    let values = face
        .descriptor
        .ok_or_else(|| AttendanceError::InvalidFaceData("face descriptor is missing".to_string()))?;

    if let Some(photo) = &face.photo_metadata {
        check_photo_reference(photo)?;
    }

    let sample = FaceSample {
        descriptor: FaceDescriptor::new(values)?,
        captured_at: face.timestamp,
    };

    Ok(FaceClaim::new(sample, face.photo_metadata))
}

/// Builds the service query. `userId` is only honoured, and only parsed, for admins.
fn history_query(
    caller: &SessionInfo,
    params: HistoryParams,
) -> Result<HistoryQuery, AttendanceError> {
    // ---
    let user_id = match params.user_id.as_deref() {
        Some(raw) if caller.role.is_admin() => Some(
            raw.parse::<Uuid>()
                .map_err(|_| AttendanceError::InvalidRequest(format!("invalid userId: {raw}")))?,
        ),
        _ => None,
    };

    Ok(HistoryQuery {
        user_id,
        start_date: params.start_date,
        end_date: params.end_date,
    })
}

/// POST /api/attendance
///
/// Records today's check-in for the caller. The session is checked before the
/// body, so an anonymous caller gets 401 even with a malformed payload.
pub async fn submit_attendance(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<SubmitAttendanceRequest>, JsonRejection>,
) -> Result<Json<SubmitAttendanceResponse>, ApiError> {
    // ---
    let caller = extract_caller(&headers, &state).await?;

    let Json(req) = payload.map_err(|e| {
        AttendanceError::InvalidFaceData(format!("malformed request body: {}", e.body_text()))
    })?;
    let claim = claim_from_request(req)?;

    let recorded = state.service().record(&caller, claim).await?;

    Ok(Json(SubmitAttendanceResponse {
        success: true,
        message: "Attendance recorded successfully".to_string(),
        attendance: AttendanceReceipt {
            id: recorded.event.id,
            timestamp: recorded.event.timestamp,
            status: recorded.event.status,
            user: recorded.user,
            has_photo: recorded.event.has_photo,
        },
    }))
}

/// GET /api/attendance?userId&startDate&endDate
///
/// Newest first. Regular users only ever receive their own events.
pub async fn list_attendance(
    State(state): State<AppState>,
    headers: HeaderMap,
    params: Result<Query<HistoryParams>, QueryRejection>,
) -> Result<Json<Vec<AttendanceEntry>>, ApiError> {
    // ---
    let caller = extract_caller(&headers, &state).await?;

    let Query(params) = params.map_err(|e| AttendanceError::InvalidRequest(e.body_text()))?;
    let query = history_query(&caller, params)?;

    let entries = state.service().history(&caller, query).await?;
    tracing::debug!(count = entries.len(), username = %caller.username, "History served");

    Ok(Json(entries))
}
