//! Observability for Hierarch services.
//!
//! - **Logging**: `tracing-subscriber` with an `EnvFilter`, JSON or pretty
//! - **Metrics**: request counters and latency histograms via `metrics`,
//!   with an opt-in Prometheus recorder
//!
//! The dispatcher emits its spans and events through `tracing` and records
//! metrics through [`metrics::record_request`]; neither requires this
//! crate's initialisers to have run.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig, LogFormat};
pub use metrics::{init_metrics, render_metrics, InFlightGuard};

/// Result type for telemetry initialisation.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
