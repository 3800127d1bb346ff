//! Prometheus metrics implementation.
//!
//! Concrete `Metrics` backed by the global `metrics` crate registry. The
//! helpers in `counters.rs` record values and `recorder.rs` owns the single
//! `PrometheusHandle` used for rendering.

use crate::domain::{AttendanceStatus, Metrics};
use std::time::Instant;

/// Prometheus-based metrics implementation.
///
/// Stateless: all series live in the global registry installed by
/// `recorder::init_metrics`.
pub struct PrometheusMetrics {
    // Empty - uses global metrics registry pattern
}

impl PrometheusMetrics {
    pub fn new() -> Self {
        tracing::info!("Creating Prometheus metrics");
        PrometheusMetrics {}
    }
}

impl Metrics for PrometheusMetrics {
    fn render(&self) -> String {
        super::render_metrics()
    }

    fn record_attendance(&self, status: AttendanceStatus) {
        tracing::debug!("Recording attendance {status}");
        super::increment_attendance_recorded(status);
    }

    fn record_duplicate_rejected(&self) {
        super::increment_duplicate_rejected();
    }

    fn record_photo_upload(&self, outcome: &str) {
        super::increment_photo_upload(outcome);
    }

    fn record_http_request(&self, start: Instant, path: &str, method: &str, status: u16) {
        super::track_http_request(start, path, method, status);
    }
}
