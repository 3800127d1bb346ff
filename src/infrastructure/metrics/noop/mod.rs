mod noop_metrics;

use noop_metrics::NoopMetrics;
use std::sync::Arc;

/// Creates the metrics backend used when Prometheus is disabled.
///
/// Attendance counters and request timings are dropped, and `/metrics`
/// renders an empty body.
pub fn create() -> anyhow::Result<crate::domain::MetricsPtr> {
    Ok(Arc::new(NoopMetrics))
}
