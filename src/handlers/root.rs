use axum::response::IntoResponse;

pub async fn root_handler() -> impl IntoResponse {
    let version = env!("CARGO_PKG_VERSION");
    format!(
        r#"Attendance Capture API
Version: {version}

Available endpoints (Authorization: Bearer <session token> unless noted):
  - POST   /api/attendance               - Record today's attendance from a face claim
  - GET    /api/attendance               - Attendance history (?userId&startDate&endDate)
  - POST   /api/attendance/photo         - Upload a captured photo to Google Drive
  - GET    /api/attendance/{{id}}/photo    - View the photo of an attendance event
  - GET    /api/storage/consent          - Google Drive consent URL (admin)
  - GET    /api/oauth2callback           - OAuth redirect target (no token)
  - GET    /health                       - Light health check
  - GET    /health?mode=full             - Full health check (database and sessions)
  - GET    /metrics                      - Prometheus metrics
"#
    )
}
