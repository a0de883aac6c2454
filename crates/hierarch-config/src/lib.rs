//! # Hierarch Config
//!
//! Typed, layered configuration for a Hierarch service.
//!
//! ```toml
//! [service]
//! name = "users"
//! base_path = "/api"
//! supported_versions = [1, 2]
//! development_mode = false
//! access_mismatch = "not_found"   # or "forbidden"
//!
//! [logging]
//! level = "info,hierarch_dispatch=debug"
//! format = "json"                 # or "pretty"
//! ```
//!
//! Unknown keys are rejected. Every key can be overridden from the
//! environment as `HIERARCH__<SECTION>__<KEY>` once
//! [`ConfigLoader::with_env_prefix`] is set.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod loader;

pub use config::{LoggingSection, ServiceConfig, ServiceSection};
pub use error::ConfigError;
pub use loader::ConfigLoader;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;
