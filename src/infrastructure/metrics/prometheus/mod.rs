mod counters;
mod prometheus_metrics;
mod recorder;

pub use prometheus_metrics::PrometheusMetrics;
use std::sync::Arc;

pub(crate) use counters::{
    increment_attendance_recorded, increment_duplicate_rejected, increment_photo_upload,
    track_http_request,
};
pub(crate) use recorder::{init_metrics, render_metrics};

/// Creates a new Prometheus metrics implementation.
///
/// Installs the global recorder on first use; the returned instance renders
/// everything recorded through the `metrics` macros.
pub fn create() -> anyhow::Result<crate::domain::MetricsPtr> {
    tracing::info!("Initializing Prometheus metrics");
    init_metrics()?;

    Ok(Arc::new(PrometheusMetrics::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AttendanceStatus;

    #[test]
    fn test_create_is_idempotent_and_renders_counters() {
        // ---
        let first = create().unwrap();
        let second = create().unwrap();

        first.record_attendance(AttendanceStatus::Late);
        second.record_photo_upload("quota_exceeded");

        let text = first.render();
        assert!(text.contains("attendance_recorded_total"));
        assert!(text.contains("attendance_photo_uploads_total"));
    }
}
