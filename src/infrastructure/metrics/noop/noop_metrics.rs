use crate::domain::{AttendanceStatus, Metrics};
use std::time::Instant;

/// Discards every measurement.
pub struct NoopMetrics;

impl Metrics for NoopMetrics {
    // ---
    fn render(&self) -> String {
        String::new()
    }
    fn record_attendance(&self, _: AttendanceStatus) {}
    fn record_duplicate_rejected(&self) {}
    fn record_photo_upload(&self, _: &str) {}
    fn record_http_request(&self, _: Instant, _: &str, _: &str, _: u16) {}
}
