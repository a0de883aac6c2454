//! Request metrics.
//!
//! | Metric | Type | Labels |
//! |--------|------|--------|
//! | `hierarch_requests_total` | Counter | `resource`, `method`, `status` |
//! | `hierarch_request_duration_seconds` | Histogram | `resource`, `method` |
//! | `hierarch_in_flight_requests` | Gauge | - |
//! | `hierarch_validation_failures_total` | Counter | `resource`, `method` |
//!
//! Recording goes through the `metrics` facade and is a no-op until a
//! recorder is installed. [`init_metrics`] installs a Prometheus recorder
//! on request; nothing is installed implicitly.

use crate::error::TelemetryError;
use crate::TelemetryResult;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Duration;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Installs a global Prometheus recorder.
///
/// Calling it again after a successful install is a no-op.
pub fn init_metrics() -> TelemetryResult<()> {
    if METRICS_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    let _ = METRICS_HANDLE.set(handle);
    register_metric_descriptions();
    Ok(())
}

/// Renders metrics in Prometheus text format, if [`init_metrics`] ran.
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

fn register_metric_descriptions() {
    describe_counter!(
        "hierarch_requests_total",
        "Total number of resource requests handled"
    );
    describe_histogram!(
        "hierarch_request_duration_seconds",
        "Resource request duration in seconds"
    );
    describe_gauge!(
        "hierarch_in_flight_requests",
        "Number of resource requests currently being handled"
    );
    describe_counter!(
        "hierarch_validation_failures_total",
        "Request payloads rejected by schema validation"
    );
}

/// Records a completed request.
pub fn record_request(resource: &str, method: &str, status_code: u16, duration: Duration) {
    counter!(
        "hierarch_requests_total",
        "resource" => resource.to_string(),
        "method" => method.to_string(),
        "status" => status_code.to_string()
    )
    .increment(1);

    histogram!(
        "hierarch_request_duration_seconds",
        "resource" => resource.to_string(),
        "method" => method.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Records a payload rejected by schema validation.
pub fn record_validation_failure(resource: &str, method: &str) {
    counter!(
        "hierarch_validation_failures_total",
        "resource" => resource.to_string(),
        "method" => method.to_string()
    )
    .increment(1);
}

/// Keeps `hierarch_in_flight_requests` raised while alive.
#[derive(Debug)]
pub struct InFlightGuard {
    _private: (),
}

impl InFlightGuard {
    /// Increments the gauge; dropping the guard decrements it.
    #[must_use]
    pub fn new() -> Self {
        gauge!("hierarch_in_flight_requests").increment(1.0);
        Self { _private: () }
    }
}

impl Default for InFlightGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        gauge!("hierarch_in_flight_requests").decrement(1.0);
    }
}
