//! Metrics backends selected by `ATTENDANCE_METRICS_TYPE`.

mod noop;
mod prometheus;

pub use noop::create as create_noop_metrics;
pub use prometheus::create as create_prom_metrics;
