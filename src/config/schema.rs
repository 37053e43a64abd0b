//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the monitor.
//! All types derive Serde traits for deserialization from config files.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Root configuration for the monitoring service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MonitorConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Runtime mode and service identity.
    pub runtime: RuntimeConfig,

    /// Log buffer, metrics window and tracing settings.
    pub observability: ObservabilityConfig,

    /// Reporting surface settings (reset secret, query limits).
    pub admin: AdminConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Deployment mode. Development discloses internal error details to clients
/// and forwards DEBUG log entries to the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeMode {
    #[default]
    Production,
    Development,
}

impl RuntimeMode {
    pub fn is_development(&self) -> bool {
        matches!(self, RuntimeMode::Development)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RuntimeMode::Production => "production",
            RuntimeMode::Development => "development",
        }
    }
}

impl fmt::Display for RuntimeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuntimeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(RuntimeMode::Production),
            "development" | "dev" => Ok(RuntimeMode::Development),
            other => Err(other.to_string()),
        }
    }
}

/// Runtime configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Production or development.
    pub mode: RuntimeMode,

    /// Service name reported by the health endpoint.
    pub service_name: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            mode: RuntimeMode::Production,
            service_name: "site-monitor".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Capacity of the log buffer and of the request-outcome window.
    pub max_entries: usize,

    /// Forward DEBUG entries to the console sink. Defaults to on in
    /// development mode when left unset.
    pub verbose: Option<bool>,

    /// Tracing filter level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit console logs as JSON lines.
    pub json_logs: bool,

    /// Enable the Prometheus scrape endpoint.
    pub prometheus_enabled: bool,

    /// Prometheus endpoint bind address.
    pub prometheus_address: String,
}

impl ObservabilityConfig {
    /// Resolve the verbose flag against the runtime mode.
    pub fn verbose_for(&self, mode: RuntimeMode) -> bool {
        self.verbose.unwrap_or_else(|| mode.is_development())
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            verbose: None,
            log_level: "info".to_string(),
            json_logs: false,
            prometheus_enabled: false,
            prometheus_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Reporting surface configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Shared secret required by the reset action. When unset every reset
    /// attempt is rejected.
    pub reset_token: Option<String>,

    /// Default number of log entries returned by the logs action.
    pub log_limit_default: usize,

    /// Upper bound accepted for the logs action `limit` parameter.
    pub log_limit_max: usize,

    /// Default number of outcomes returned by the requests action.
    pub request_limit_default: usize,

    /// Upper bound accepted for the requests action `limit` parameter.
    pub request_limit_max: usize,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            reset_token: None,
            log_limit_default: 100,
            log_limit_max: 1000,
            request_limit_default: 50,
            request_limit_max: 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let config: MonitorConfig = toml::from_str("").unwrap();
        assert_eq!(config.observability.max_entries, 1000);
        assert_eq!(config.admin.log_limit_max, 1000);
        assert_eq!(config.admin.request_limit_max, 500);
        assert_eq!(config.runtime.mode, RuntimeMode::Production);
        assert!(config.admin.reset_token.is_none());
    }

    #[test]
    fn test_partial_sections() {
        let config: MonitorConfig = toml::from_str(
            r#"
            [runtime]
            mode = "development"

            [admin]
            reset_token = "s3cret"
            "#,
        )
        .unwrap();
        assert!(config.runtime.mode.is_development());
        assert_eq!(config.admin.reset_token.as_deref(), Some("s3cret"));
        assert_eq!(config.admin.log_limit_default, 100);
    }

    #[test]
    fn test_verbose_follows_mode_unless_set() {
        let mut obs = ObservabilityConfig::default();
        assert!(!obs.verbose_for(RuntimeMode::Production));
        assert!(obs.verbose_for(RuntimeMode::Development));

        obs.verbose = Some(false);
        assert!(!obs.verbose_for(RuntimeMode::Development));
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("DEV".parse::<RuntimeMode>(), Ok(RuntimeMode::Development));
        assert_eq!(" production ".parse::<RuntimeMode>(), Ok(RuntimeMode::Production));
        assert!("staging".parse::<RuntimeMode>().is_err());
    }
}
