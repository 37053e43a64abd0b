//! Configuration loading from disk and the process environment.

use std::fmt;
use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{MonitorConfig, RuntimeMode};
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable holding the reset shared secret.
pub const RESET_TOKEN_VAR: &str = "RESET_TOKEN";

/// Environment variable selecting production or development mode.
pub const MODE_VAR: &str = "APP_ENV";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value '{value}' for {var}")]
    Env { var: &'static str, value: String },

    #[error("Validation failed: {}", ValidationList(.0))]
    Validation(Vec<ValidationError>),
}

struct ValidationList<'a>(&'a [ValidationError]);

impl fmt::Display for ValidationList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

/// Load and validate configuration from a TOML file, then apply
/// environment overrides.
pub fn load_config(path: &Path) -> Result<MonitorConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: MonitorConfig = toml::from_str(&content)?;
    finish(config, |var| std::env::var(var).ok())
}

/// Build a configuration from defaults and environment overrides only.
pub fn load_from_env() -> Result<MonitorConfig, ConfigError> {
    finish(MonitorConfig::default(), |var| std::env::var(var).ok())
}

fn finish<F>(mut config: MonitorConfig, lookup: F) -> Result<MonitorConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    apply_overrides(&mut config, lookup)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply `RESET_TOKEN` and `APP_ENV` on top of a parsed configuration.
pub fn apply_overrides<F>(config: &mut MonitorConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(token) = lookup(RESET_TOKEN_VAR) {
        config.admin.reset_token = Some(token);
    }

    if let Some(raw) = lookup(MODE_VAR) {
        config.runtime.mode = raw.parse::<RuntimeMode>().map_err(|value| ConfigError::Env {
            var: MODE_VAR,
            value,
        })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = MonitorConfig::default();
        config.admin.reset_token = Some("from-file".into());

        apply_overrides(
            &mut config,
            env(&[(RESET_TOKEN_VAR, "from-env"), (MODE_VAR, "development")]),
        )
        .unwrap();

        assert_eq!(config.admin.reset_token.as_deref(), Some("from-env"));
        assert_eq!(config.runtime.mode, RuntimeMode::Development);
    }

    #[test]
    fn test_bad_mode_is_rejected() {
        let mut config = MonitorConfig::default();
        let err = apply_overrides(&mut config, env(&[(MODE_VAR, "staging")])).unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: MODE_VAR, .. }));
    }

    #[test]
    fn test_empty_env_token_fails_validation() {
        let err = finish(MonitorConfig::default(), env(&[(RESET_TOKEN_VAR, "")])).unwrap_err();
        match err {
            ConfigError::Validation(errors) => assert_eq!(errors[0].field, "admin.reset_token"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_config_from_file() {
        let path = std::env::temp_dir().join("site_monitor_loader_test.toml");
        fs::write(
            &path,
            "[listener]\nbind_address = \"127.0.0.1:4000\"\n[observability]\nmax_entries = 50\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:4000");
        assert_eq!(config.observability.max_entries, 50);

        fs::remove_file(&path).unwrap_or_default();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/site-monitor.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
