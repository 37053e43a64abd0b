//! Health verdict derived from a SystemMetrics snapshot.
//!
//! # Policy
//! ```text
//! memory.percentage >= 90   → Degraded
//! errors.total      >= 100  → Degraded
//! otherwise                 → Healthy
//! ```
//!
//! # Design Decisions
//! - Pure function of its input: no store access, no clock
//! - Thresholds are fixed constants, not call-time parameters

use serde::Serialize;

use crate::observability::SystemMetrics;

/// Memory usage, in percent, at which the service reports degraded.
pub const MEMORY_DEGRADED_PERCENT: f64 = 90.0;

/// Failed requests in the resident window at which the service reports degraded.
pub const ERROR_DEGRADED_TOTAL: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub reasons: Vec<String>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

pub fn evaluate(metrics: &SystemMetrics) -> HealthReport {
    let mut reasons = Vec::new();

    if metrics.memory.percentage >= MEMORY_DEGRADED_PERCENT {
        reasons.push(format!(
            "memory usage {:.1}% at or above {}%",
            metrics.memory.percentage, MEMORY_DEGRADED_PERCENT
        ));
    }
    if metrics.errors.total >= ERROR_DEGRADED_TOTAL {
        reasons.push(format!(
            "{} failed requests at or above {}",
            metrics.errors.total, ERROR_DEGRADED_TOTAL
        ));
    }

    let status = if reasons.is_empty() {
        HealthStatus::Healthy
    } else {
        HealthStatus::Degraded
    };
    HealthReport { status, reasons }
}
