//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (capacities > 0, limit defaults within bounds)
//! - Check the listener and Prometheus addresses parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: MonitorConfig → Result<(), Vec<ValidationError>>

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::MonitorConfig;

/// Largest accepted `observability.max_entries`.
pub const MAX_ENTRIES_CEILING: usize = 100_000;

/// Largest accepted `admin.log_limit_max`.
pub const LOG_LIMIT_CEILING: usize = 1000;

/// Largest accepted `admin.request_limit_max`.
pub const REQUEST_LIMIT_CEILING: usize = 500;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Check a loaded configuration for semantic errors.
pub fn validate_config(config: &MonitorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    let obs = &config.observability;
    if obs.max_entries == 0 || obs.max_entries > MAX_ENTRIES_CEILING {
        errors.push(ValidationError::new(
            "observability.max_entries",
            format!("must be between 1 and {}", MAX_ENTRIES_CEILING),
        ));
    }
    if obs.prometheus_enabled && obs.prometheus_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "observability.prometheus_address",
            format!("'{}' is not a socket address", obs.prometheus_address),
        ));
    }

    let admin = &config.admin;
    check_limit(
        &mut errors,
        "admin.log_limit_default",
        admin.log_limit_default,
        "admin.log_limit_max",
        admin.log_limit_max,
        LOG_LIMIT_CEILING,
    );
    check_limit(
        &mut errors,
        "admin.request_limit_default",
        admin.request_limit_default,
        "admin.request_limit_max",
        admin.request_limit_max,
        REQUEST_LIMIT_CEILING,
    );

    if matches!(admin.reset_token.as_deref(), Some(t) if t.is_empty()) {
        errors.push(ValidationError::new(
            "admin.reset_token",
            "must not be empty; omit it to disable reset",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_limit(
    errors: &mut Vec<ValidationError>,
    default_field: &'static str,
    default: usize,
    max_field: &'static str,
    max: usize,
    ceiling: usize,
) {
    if max == 0 || max > ceiling {
        errors.push(ValidationError::new(
            max_field,
            format!("must be between 1 and {}", ceiling),
        ));
    }
    if default == 0 || default > max {
        errors.push(ValidationError::new(
            default_field,
            format!("must be between 1 and {}", max),
        ));
    }
}
