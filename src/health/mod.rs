//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! GET /api/health
//!     → MetricsStore::system_metrics (fresh snapshot)
//!     → evaluator.rs (pure verdict)
//!     → 200 healthy / 503 degraded
//!
//! Snapshot failure (memory unavailable)
//!     → 503 with a minimal "unhealthy" payload
//! ```

pub mod evaluator;

pub use evaluator::{evaluate, HealthReport, HealthStatus, ERROR_DEGRADED_TOTAL, MEMORY_DEGRADED_PERCENT};
