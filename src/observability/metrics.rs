//! Prometheus exposition of request and log activity.
//!
//! # Metrics
//! - `site_requests_total` (counter): completed requests by method, status
//! - `site_request_duration_seconds` (histogram): latency by method
//! - `site_log_entries_total` (counter): buffered log entries by level
//!
//! Without an installed recorder every call is a no-op, so the stores and
//! middleware call these unconditionally.

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::observability::log_store::LogLevel;

/// Install the global recorder and serve `/metrics` on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Prometheus exporter listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, duration: Duration) {
    counter!(
        "site_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "site_request_duration_seconds",
        "method" => method.to_string()
    )
    .record(duration.as_secs_f64());
}

pub fn record_log_entry(level: LogLevel) {
    counter!("site_log_entries_total", "level" => level.as_str()).increment(1);
}
