use anyhow::{anyhow, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder globally, once per process.
///
/// Later calls reuse the first handle, so building several routers in one
/// process (as the integration tests do) is safe.
pub fn init_metrics() -> Result<()> {
    // ---
    if HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow!("failed to install Prometheus recorder: {e}"))?;

    // A concurrent initializer may have won; its handle is equivalent.
    let _ = HANDLE.set(handle);
    Ok(())
}

/// Render the current metrics in Prometheus text format.
pub fn render_metrics() -> String {
    HANDLE.get().map(|h| h.render()).unwrap_or_default()
}
