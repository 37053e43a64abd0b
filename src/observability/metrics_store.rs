//! Request outcome window and running error counts.
//!
//! # Responsibilities
//! - Keep the most recent `max_entries` request outcomes
//! - Count failures (status >= 400) by status code, independent of the window
//! - Derive SystemMetrics snapshots on demand
//!
//! # Design Decisions
//! - Error counts are a running total: eviction from the window never
//!   decrements them, only `reset` clears them
//! - `requests.*` and `errors.total` are computed over the resident window,
//!   so they and `errors.byCode` cover different horizons
//! - Memory is sampled through a `MemoryProbe` outside the store lock

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::log_metadata;
use crate::observability::log_store::LogStore;
use crate::observability::memory::{MemoryProbe, MemoryProbeError, MemoryUsage};
use crate::observability::window::{MonotonicClock, Window};

/// The observable result of one completed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestOutcome {
    pub path: String,
    pub method: String,
    pub status_code: u16,
    pub duration_millis: u64,
    pub timestamp: DateTime<Utc>,
}

impl RequestOutcome {
    /// Build an outcome observed now.
    pub fn new(path: impl Into<String>, method: impl Into<String>, status_code: u16, duration_millis: u64) -> Self {
        Self {
            path: path.into(),
            method: method.into(),
            status_code,
            duration_millis,
            timestamp: Utc::now(),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.status_code >= 400
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestTotals {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub average_duration_millis: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorTotals {
    pub total: usize,
    pub by_code: BTreeMap<String, u64>,
}

/// Point-in-time view derived from the store and live memory stats.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemMetrics {
    pub uptime_millis: u64,
    pub memory: MemoryUsage,
    pub requests: RequestTotals,
    pub errors: ErrorTotals,
}

struct MetricsState {
    outcomes: Window<RequestOutcome>,
    clock: MonotonicClock,
    error_counts: BTreeMap<String, u64>,
    started: Instant,
}

/// Capacity-bounded outcome store shared by every request.
pub struct MetricsStore {
    state: RwLock<MetricsState>,
    logs: Arc<LogStore>,
    memory: Arc<dyn MemoryProbe>,
}

impl MetricsStore {
    pub fn new(max_entries: usize, logs: Arc<LogStore>, memory: Arc<dyn MemoryProbe>) -> Self {
        Self {
            state: RwLock::new(MetricsState {
                outcomes: Window::new(max_entries),
                clock: MonotonicClock::default(),
                error_counts: BTreeMap::new(),
                started: Instant::now(),
            }),
            logs,
            memory,
        }
    }

    /// Append an outcome, bump the running error count for failures, and
    /// log it (WARN for failures, DEBUG otherwise).
    pub fn record(&self, mut outcome: RequestOutcome) {
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            outcome.timestamp = state.clock.observe(outcome.timestamp);
            if outcome.is_failure() {
                *state
                    .error_counts
                    .entry(outcome.status_code.to_string())
                    .or_insert(0) += 1;
            }
            state.outcomes.push(outcome.clone());
        }

        let metadata = log_metadata! {
            "path" => outcome.path,
            "statusCode" => outcome.status_code,
            "duration" => outcome.duration_millis,
        };
        if outcome.is_failure() {
            self.logs.warn("Request failed", Some(metadata));
        } else {
            self.logs.debug("Request completed", Some(metadata));
        }
    }

    /// Compute a fresh snapshot. Fails only when memory cannot be sampled.
    pub fn system_metrics(&self) -> Result<SystemMetrics, MemoryProbeError> {
        let memory = self.memory.sample()?;
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);

        let total = state.outcomes.len();
        let failed = state.outcomes.iter().filter(|o| o.is_failure()).count();
        let duration_sum: u64 = state.outcomes.iter().map(|o| o.duration_millis).sum();
        let average_duration_millis = if total == 0 {
            0
        } else {
            (duration_sum as f64 / total as f64).round() as u64
        };

        Ok(SystemMetrics {
            uptime_millis: state.started.elapsed().as_millis() as u64,
            memory,
            requests: RequestTotals {
                total,
                successful: total - failed,
                failed,
                average_duration_millis,
            },
            errors: ErrorTotals {
                total: failed,
                by_code: state.error_counts.clone(),
            },
        })
    }

    /// Up to `limit` most recent outcomes, newest first.
    pub fn recent(&self, limit: usize) -> Vec<RequestOutcome> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.outcomes.iter().rev().take(limit).cloned().collect()
    }

    /// Clear the window and error counts and restart the uptime clock.
    pub fn reset(&self) {
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            state.outcomes.clear();
            state.error_counts.clear();
            state.started = Instant::now();
        }
        self.logs.info("Monitor reset", None);
    }

    pub fn len(&self) -> usize {
        self.state.read().unwrap_or_else(PoisonError::into_inner).outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
