//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Instrumentation middleware (per completed request):
//!     → metrics_store.rs (RequestOutcome window + running error counts)
//!         → log_store.rs (WARN/DEBUG outcome line)
//!     → log_store.rs (INFO request line)
//!         → logging.rs TracingSink (console)
//!     → metrics.rs (Prometheus counters, optional)
//!
//! Reporting surface (on demand):
//!     → log_store.rs query/stats
//!     → metrics_store.rs system_metrics/recent
//!         → memory.rs (live process memory)
//! ```
//!
//! # Design Decisions
//! - Stores are plain values owned by the composition root and shared via Arc
//! - All state is in-process and lost on restart
//! - Store writes never fail; eviction replaces overflow

pub mod log_store;
pub mod logging;
pub mod memory;
pub mod metrics;
pub mod metrics_store;
mod window;

pub use log_store::{ErrorInfo, LogEntry, LogLevel, LogSink, LogStats, LogStore, Metadata};
pub use memory::{MemoryProbe, MemoryProbeError, MemoryUsage, ProcessMemoryProbe, StaticMemoryProbe};
pub use metrics_store::{MetricsStore, RequestOutcome, SystemMetrics};
