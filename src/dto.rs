//! JSON request and response bodies of the HTTP API.
//!
//! Shared by the server handlers and [`crate::capture::AttendanceClient`], so
//! both sides agree on the camelCase wire format.

use crate::domain::{AttendanceStatus, PhotoReference, UserSummary};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of `POST /api/attendance`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAttendanceRequest {
    // ---
    #[serde(default)]
    pub face_data: Option<FaceDataPayload>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceDataPayload {
    // ---
    #[serde(default)]
    pub descriptor: Option<Vec<f32>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_metadata: Option<PhotoReference>,
}

/// The committed event as returned to the client. Never carries the photo link.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceReceipt {
    // ---
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub status: AttendanceStatus,
    pub user: UserSummary,
    pub has_photo: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAttendanceResponse {
    // ---
    pub success: bool,
    pub message: String,
    pub attendance: AttendanceReceipt,
}

/// Body of `POST /api/attendance/photo`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadPhotoRequest {
    // ---
    /// Base64 JPEG, optionally as a `data:image/...;base64,` URL.
    #[serde(default)]
    pub photo: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadPhotoResponse {
    // ---
    pub success: bool,
    pub photo_metadata: PhotoReference,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentUrlResponse {
    // ---
    pub auth_url: String,
    pub instructions: String,
}

/// Raw history filters. `userId` stays a string until the caller is known to
/// be an admin, so a regular user's value is ignored rather than parsed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryParams {
    // ---
    pub user_id: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConsentCallbackParams {
    // ---
    pub code: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentCallbackResponse {
    // ---
    pub success: bool,
    pub refresh_token: Option<String>,
    pub access_token: String,
    pub expires_in: Option<i64>,
}

/// Error body for every non-2xx JSON response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    // ---
    pub error: String,

    /// Storage failure class, present on 502 responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}
