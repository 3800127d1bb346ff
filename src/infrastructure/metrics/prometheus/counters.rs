use crate::domain::AttendanceStatus;
use metrics::{counter, histogram};
use std::time::Instant;

/// Count a committed attendance event by status.
pub fn increment_attendance_recorded(status: AttendanceStatus) {
    counter!("attendance_recorded_total", "status" => status.as_str()).increment(1);
}

/// Count a claim rejected as a same-day duplicate.
pub fn increment_duplicate_rejected() {
    counter!("attendance_duplicates_rejected_total").increment(1);
}

/// Count a photo upload attempt by outcome.
pub fn increment_photo_upload(outcome: &str) {
    counter!("attendance_photo_uploads_total", "outcome" => outcome.to_string()).increment(1);
}

/// Track HTTP request latency using a histogram.
pub fn track_http_request(start: Instant, path: &str, method: &str, status: u16) {
    let elapsed = start.elapsed();
    histogram!(
        "http_request_duration_seconds",
        "path" => path.to_string(),
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .record(elapsed);
}
