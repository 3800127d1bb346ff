use super::models::AttendanceStatus;
use std::sync::Arc;
use std::time::Instant;

/// Abstraction for application metrics (counters, histograms).
pub trait Metrics: Send + Sync + 'static {
    // ---
    /// Render current metrics in Prometheus text format.
    fn render(&self) -> String;

    /// Record a committed attendance event.
    fn record_attendance(&self, status: AttendanceStatus);

    /// Record a claim rejected because the day was already taken.
    fn record_duplicate_rejected(&self);

    /// Record a photo upload attempt; `outcome` is "ok" or a storage error kind.
    fn record_photo_upload(&self, outcome: &str);

    /// Record HTTP request duration and labels.
    fn record_http_request(&self, start: Instant, path: &str, method: &str, status: u16);
}

/// Type alias for any backend that implements Metrics.
pub type MetricsPtr = Arc<dyn Metrics>;
