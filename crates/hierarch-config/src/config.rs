//! Service configuration types.

use hierarch_core::{normalize_base_path, AccessMismatchPolicy, SetupResult};
use hierarch_telemetry::{LogConfig, LogFormat};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Complete configuration of one Hierarch service.
///
/// # Example
///
/// ```
/// use hierarch_config::ServiceConfig;
///
/// let config = ServiceConfig::default();
/// assert_eq!(config.service.supported_versions, vec![1]);
/// assert!(!config.service.development_mode);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Routing and dispatch settings.
    #[serde(default)]
    pub service: ServiceSection,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingSection,
}

impl ServiceConfig {
    /// Development preset: diagnostics in 5xx bodies, pretty debug logs.
    #[must_use]
    pub fn development() -> Self {
        Self {
            service: ServiceSection {
                development_mode: true,
                ..ServiceSection::default()
            },
            logging: LoggingSection {
                level: "debug".to_string(),
                format: LogFormat::Pretty,
            },
        }
    }

    /// Production preset: no diagnostics, JSON logs at `info`.
    #[must_use]
    pub fn production() -> Self {
        Self::default()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The service name is empty
    /// - The base path cannot be used as a route prefix
    /// - The version list is empty or has duplicates
    /// - The log filter does not parse
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service.name.trim().is_empty() {
            return Err(ConfigError::invalid_value("service.name", "must not be empty"));
        }

        self.service.normalized_base_path().map_err(|_| {
            ConfigError::invalid_value(
                "service.base_path",
                format!("not usable as a route prefix: {}", self.service.base_path),
            )
        })?;

        if self.service.supported_versions.is_empty() {
            return Err(ConfigError::invalid_value(
                "service.supported_versions",
                "at least one version is required",
            ));
        }
        let mut versions = self.service.supported_versions.clone();
        versions.sort_unstable();
        versions.dedup();
        if versions.len() != self.service.supported_versions.len() {
            return Err(ConfigError::invalid_value(
                "service.supported_versions",
                "versions must be unique",
            ));
        }

        hierarch_telemetry::create_env_filter(&self.logging.level)
            .map_err(|e| ConfigError::invalid_value("logging.level", e.to_string()))?;

        Ok(())
    }
}

/// Routing and dispatch settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServiceSection {
    /// Service name, used in logs.
    #[serde(default = "default_name")]
    pub name: String,

    /// Prefix of every route, e.g. `/api`. Empty mounts at the root.
    #[serde(default)]
    pub base_path: String,

    /// API versions the service answers.
    #[serde(default = "default_versions")]
    pub supported_versions: Vec<u32>,

    /// Include diagnostics in server error bodies.
    #[serde(default)]
    pub development_mode: bool,

    /// Status used when a caller addresses another caller's resource.
    #[serde(default)]
    pub access_mismatch: AccessMismatchPolicy,
}

fn default_name() -> String {
    "hierarch".to_string()
}

fn default_versions() -> Vec<u32> {
    vec![1]
}

impl Default for ServiceSection {
    fn default() -> Self {
        Self {
            name: default_name(),
            base_path: String::new(),
            supported_versions: default_versions(),
            development_mode: false,
            access_mismatch: AccessMismatchPolicy::default(),
        }
    }
}

impl ServiceSection {
    /// The base path with a leading `/` and no trailing `/`; empty for the root.
    ///
    /// # Errors
    ///
    /// Returns [`hierarch_core::SetupError::InvalidBasePath`] if the path is not usable as a
    /// route prefix.
    ///
    /// # Example
    ///
    /// ```
    /// use hierarch_config::ServiceSection;
    ///
    /// let section = ServiceSection {
    ///     base_path: "api/".to_string(),
    ///     ..Default::default()
    /// };
    /// assert_eq!(section.normalized_base_path().unwrap(), "/api");
    /// ```
    pub fn normalized_base_path(&self) -> SetupResult<String> {
        normalize_base_path(&self.base_path)
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    /// Filter directives.
    #[serde(default = "default_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::Json,
        }
    }
}

impl LoggingSection {
    /// Builds the telemetry logging configuration.
    #[must_use]
    pub fn to_log_config(&self) -> LogConfig {
        let base = match self.format {
            LogFormat::Json => LogConfig::production(),
            LogFormat::Pretty => LogConfig::development(),
        };
        LogConfig {
            level: self.level.clone(),
            ..base
        }
    }
}
