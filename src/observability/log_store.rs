//! In-process structured log buffer.
//!
//! # Responsibilities
//! - Keep the most recent `max_entries` log entries, oldest evicted first
//! - Serve level-filtered reads and per-level statistics
//! - Forward every entry to an optional console/telemetry sink
//!
//! # Design Decisions
//! - Append and evict happen under one write lock; readers clone out
//! - Timestamps are taken inside the lock so they follow insertion order
//! - The sink runs after the lock is released and its panics are swallowed
//! - DEBUG entries reach the sink only in verbose mode

use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::observability::metrics;
use crate::observability::window::{MonotonicClock, Window};

/// Default capacity of the log buffer.
pub const DEFAULT_MAX_ENTRIES: usize = 1000;

/// Structured key/value data attached to an entry.
pub type Metadata = Map<String, Value>;

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub const ALL: [LogLevel; 4] = [LogLevel::Debug, LogLevel::Info, LogLevel::Warn, LogLevel::Error];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown log level '{0}'")]
pub struct UnknownLevel(pub String);

impl FromStr for LogLevel {
    type Err = UnknownLevel;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LogLevel::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownLevel(s.to_string()))
    }
}

/// Error details captured alongside an ERROR entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub name: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl ErrorInfo {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            stack: None,
        }
    }

    /// Capture an error and its `source()` chain. The chain becomes the
    /// stack text, one cause per line.
    pub fn from_error(name: impl Into<String>, err: &(dyn StdError + 'static)) -> Self {
        let mut causes = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            causes.push(format!("caused by: {}", cause));
            source = cause.source();
        }
        Self {
            name: name.into(),
            message: err.to_string(),
            stack: (!causes.is_empty()).then(|| causes.join("\n")),
        }
    }
}

/// A single immutable log record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

/// Counts over the entries currently resident in the buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogStats {
    pub total: usize,
    pub by_level: BTreeMap<LogLevel, usize>,
    pub errors: usize,
    pub warnings: usize,
}

/// Destination for entries as they are appended (console, telemetry).
pub trait LogSink: Send + Sync {
    fn forward(&self, entry: &LogEntry);
}

struct Buffer {
    entries: Window<LogEntry>,
    clock: MonotonicClock,
}

/// Capacity-bounded log buffer shared by every request.
pub struct LogStore {
    buffer: RwLock<Buffer>,
    sink: Option<Arc<dyn LogSink>>,
    verbose: bool,
}

impl LogStore {
    /// Create a store without an external sink.
    pub fn new(max_entries: usize) -> Self {
        Self {
            buffer: RwLock::new(Buffer {
                entries: Window::new(max_entries),
                clock: MonotonicClock::default(),
            }),
            sink: None,
            verbose: false,
        }
    }

    /// Attach a sink. DEBUG entries are forwarded only when `verbose` is set.
    pub fn with_sink(mut self, sink: Arc<dyn LogSink>, verbose: bool) -> Self {
        self.sink = Some(sink);
        self.verbose = verbose;
        self
    }

    /// Append an entry stamped with the current time. Never fails.
    pub fn append(
        &self,
        level: LogLevel,
        message: impl Into<String>,
        metadata: Option<Metadata>,
        error: Option<ErrorInfo>,
    ) {
        let entry = {
            let mut buffer = self.buffer.write().unwrap_or_else(PoisonError::into_inner);
            let entry = LogEntry {
                level,
                message: message.into(),
                timestamp: buffer.clock.now(),
                metadata,
                error,
            };
            buffer.entries.push(entry.clone());
            entry
        };

        metrics::record_log_entry(level);
        self.forward(&entry);
    }

    fn forward(&self, entry: &LogEntry) {
        let Some(sink) = &self.sink else {
            return;
        };
        if entry.level == LogLevel::Debug && !self.verbose {
            return;
        }
        if panic::catch_unwind(AssertUnwindSafe(|| sink.forward(entry))).is_err() {
            tracing::warn!(entry_level = %entry.level, "log sink panicked; entry kept in buffer only");
        }
    }

    pub fn debug(&self, message: impl Into<String>, metadata: Option<Metadata>) {
        self.append(LogLevel::Debug, message, metadata, None);
    }

    pub fn info(&self, message: impl Into<String>, metadata: Option<Metadata>) {
        self.append(LogLevel::Info, message, metadata, None);
    }

    pub fn warn(&self, message: impl Into<String>, metadata: Option<Metadata>) {
        self.append(LogLevel::Warn, message, metadata, None);
    }

    pub fn error(&self, message: impl Into<String>, error: Option<ErrorInfo>, metadata: Option<Metadata>) {
        self.append(LogLevel::Error, message, metadata, error);
    }

    /// Most recent `limit` entries, optionally of a single level, returned
    /// oldest first.
    pub fn query(&self, level: Option<LogLevel>, limit: usize) -> Vec<LogEntry> {
        let buffer = self.buffer.read().unwrap_or_else(PoisonError::into_inner);
        let mut entries: Vec<LogEntry> = buffer
            .entries
            .iter()
            .rev()
            .filter(|entry| level.map_or(true, |l| entry.level == l))
            .take(limit)
            .cloned()
            .collect();
        entries.reverse();
        entries
    }

    pub fn stats(&self) -> LogStats {
        let buffer = self.buffer.read().unwrap_or_else(PoisonError::into_inner);
        let mut by_level: BTreeMap<LogLevel, usize> =
            LogLevel::ALL.into_iter().map(|level| (level, 0)).collect();
        for entry in buffer.entries.iter() {
            *by_level.entry(entry.level).or_default() += 1;
        }
        LogStats {
            total: buffer.entries.len(),
            errors: by_level[&LogLevel::Error],
            warnings: by_level[&LogLevel::Warn],
            by_level,
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.read().unwrap_or_else(PoisonError::into_inner).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every resident entry.
    pub fn clear(&self) {
        self.buffer.write().unwrap_or_else(PoisonError::into_inner).entries.clear();
    }
}

impl Default for LogStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

/// Build a metadata map from `key => value` pairs.
#[macro_export]
macro_rules! log_metadata {
    ($($key:expr => $value:expr),* $(,)?) => {{
        let mut map = $crate::observability::log_store::Metadata::new();
        $( map.insert(($key).to_string(), ::serde_json::json!($value)); )*
        map
    }};
}
