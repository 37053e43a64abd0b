//! Structured console logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber for the process
//! - Forward LogStore entries to the console through tracing
//!
//! # Design Decisions
//! - `RUST_LOG` wins over the configured level
//! - JSON lines in production when `json_logs` is set, pretty text otherwise

use serde_json::Value;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;
use crate::observability::log_store::{LogEntry, LogLevel, LogSink};

/// Install the global subscriber.
pub fn init_tracing(config: &ObservabilityConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "site_monitor={level},monitor_cli={level},tower_http={level}",
            level = config.log_level
        ))
    });
    let registry = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer()).try_init()
    }
}

/// LogSink that re-emits buffered entries as tracing events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn forward(&self, entry: &LogEntry) {
        let metadata = entry
            .metadata
            .as_ref()
            .map(|m| Value::Object(m.clone()).to_string())
            .unwrap_or_default();

        match entry.level {
            LogLevel::Error => {
                let error = entry
                    .error
                    .as_ref()
                    .map(|e| format!("{}: {}", e.name, e.message))
                    .unwrap_or_default();
                tracing::error!(target: "site_monitor::log", %metadata, %error, "{}", entry.message);
            }
            LogLevel::Warn => tracing::warn!(target: "site_monitor::log", %metadata, "{}", entry.message),
            LogLevel::Info => tracing::info!(target: "site_monitor::log", %metadata, "{}", entry.message),
            LogLevel::Debug => tracing::debug!(target: "site_monitor::log", %metadata, "{}", entry.message),
        }
    }
}
