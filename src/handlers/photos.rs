//! Photo upload and retrieval handlers.

use super::auth::extract_caller;
use super::shared_types::ApiError;
use crate::app_state::AppState;
use crate::domain::{AttendanceError, PhotoReference, DEFAULT_PHOTO_MIME};
use crate::dto::{UploadPhotoRequest, UploadPhotoResponse};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::HeaderMap,
    response::Html,
    Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

static DATA_URL_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^data:image/\w+;base64,").expect("static data URL pattern"));

/// Decodes a base64 photo, accepting an optional `data:image/...;base64,` prefix.
pub(crate) fn decode_photo(photo: &str) -> Result<Vec<u8>, AttendanceError> {
    // ---
    let encoded = DATA_URL_PREFIX.replace(photo.trim(), "");
    let bytes = BASE64
        .decode(encoded.as_bytes())
        .map_err(|e| AttendanceError::InvalidRequest(format!("photo is not valid base64: {e}")))?;

    if bytes.is_empty() {
        return Err(AttendanceError::InvalidRequest("photo is empty".to_string()));
    }
    Ok(bytes)
}

/// POST /api/attendance/photo
///
/// Uploads a captured still to remote storage and returns the reference the
/// client attaches to its attendance claim.
pub async fn upload_photo(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<UploadPhotoRequest>, JsonRejection>,
) -> Result<Json<UploadPhotoResponse>, ApiError> {
    // ---
    let caller = extract_caller(&headers, &state).await?;

    let Json(req) = payload.map_err(|e| AttendanceError::InvalidRequest(e.body_text()))?;
    let photo = req
        .photo
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| AttendanceError::InvalidRequest("photo data is required".to_string()))?;
    let bytes = decode_photo(&photo)?;

    let file_name = req.file_name.filter(|n| !n.trim().is_empty()).unwrap_or_else(|| {
        format!(
            "attendance-{}-{}.jpg",
            caller.username,
            chrono::Utc::now().timestamp_millis()
        )
    });
    let file_size = bytes.len() as i64;

    let stored = match state.storage().upload(bytes, &file_name, DEFAULT_PHOTO_MIME).await {
        Ok(stored) => {
            state.metrics().record_photo_upload("ok");
            stored
        }
        Err(e) => {
            state.metrics().record_photo_upload(e.kind());
            return Err(e.into());
        }
    };

    tracing::info!(
        username = %caller.username,
        file_id = %stored.file_id,
        file_size,
        "Attendance photo stored"
    );

    Ok(Json(UploadPhotoResponse {
        success: true,
        photo_metadata: PhotoReference {
            file_id: stored.file_id,
            url: stored.web_view_link,
            file_size,
        },
    }))
}

/// GET /api/attendance/{id}/photo
///
/// Renders the stored photo inline. Only the event owner or an admin may view it.
pub async fn view_photo(
    State(state): State<AppState>,
    headers: HeaderMap,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Html<String>, ApiError> {
    // ---
    let caller = extract_caller(&headers, &state).await?;
    let Path(id) = id.map_err(|e| AttendanceError::InvalidRequest(e.body_text()))?;

    let photo = state.service().photo(&caller, id).await?;
    let bytes = state.storage().download(&photo.file_id).await?;

    Ok(Html(render_photo_page(id, &photo.mime_type, &bytes)))
}

fn render_photo_page(id: Uuid, mime_type: &str, bytes: &[u8]) -> String {
    // ---
    let encoded = BASE64.encode(bytes);
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Attendance photo {id}</title></head>
<body style="margin:0;display:flex;justify-content:center;align-items:center;min-height:100vh;background:#111">
<img src="data:{mime_type};base64,{encoded}" alt="Attendance photo {id}" style="max-width:100%;max-height:100vh">
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn data_url_prefix_is_stripped() {
        // ---
        let raw = BASE64.encode([0xFF, 0xD8, 0xFF, 0xE0]);
        let with_prefix = format!("data:image/jpeg;base64,{raw}");

        assert_eq!(decode_photo(&raw).unwrap(), vec![0xFF, 0xD8, 0xFF, 0xE0]);
        assert_eq!(decode_photo(&with_prefix).unwrap(), vec![0xFF, 0xD8, 0xFF, 0xE0]);
    }

    #[test]
    fn garbage_is_invalid_request() {
        // ---
        assert!(matches!(
            decode_photo("not base64!!"),
            Err(AttendanceError::InvalidRequest(_))
        ));
        assert!(matches!(
            decode_photo("data:image/png;base64,"),
            Err(AttendanceError::InvalidRequest(_))
        ));
    }

    #[test]
    fn page_embeds_inline_image() {
        // ---
        let page = render_photo_page(Uuid::nil(), "image/jpeg", &[1, 2, 3]);
        assert!(page.contains("data:image/jpeg;base64,AQID"));
    }
}
