//! Reporting views over the log and metrics stores.
//!
//! Each view validates its parameters first, then reads the stores. Reads
//! are snapshots: a concurrent request may or may not be included.

use std::sync::Arc;

use axum::http::StatusCode;
use chrono::Utc;
use serde_json::json;

use crate::admin::auth::authorize_reset;
use crate::config::AdminConfig;
use crate::error::HandlerError;
use crate::health::evaluate;
use crate::http::params::{parse_level, parse_limit, Param, QueryParams};
use crate::http::request::RequestInfo;
use crate::http::response::{HandlerResult, Reply};
use crate::log_metadata;
use crate::observability::{ErrorInfo, LogStore, MetricsStore, SystemMetrics};

pub const AVAILABLE_ACTIONS: [&str; 4] = ["metrics", "logs", "requests", "reset"];

/// Read side of the stores plus the reset gate.
#[derive(Clone)]
pub struct Reporting {
    logs: Arc<LogStore>,
    metrics: Arc<MetricsStore>,
    admin: AdminConfig,
    service_name: String,
}

impl Reporting {
    pub fn new(logs: Arc<LogStore>, metrics: Arc<MetricsStore>, admin: AdminConfig, service_name: impl Into<String>) -> Self {
        Self {
            logs,
            metrics,
            admin,
            service_name: service_name.into(),
        }
    }

    /// Dispatch on `action`; anything unrecognised gets the summary.
    pub fn monitor(&self, params: &QueryParams, request: &RequestInfo) -> HandlerResult {
        match params.get("action") {
            Param::Single("metrics") => self.metrics_report(),
            Param::Single("logs") => self.logs_report(params),
            Param::Single("requests") => self.requests_report(params),
            Param::Single("reset") => self.reset(params, request),
            _ => self.summary(),
        }
    }

    pub fn metrics_report(&self) -> HandlerResult {
        let system = self.snapshot()?;
        Ok(Reply::ok(json!({
            "system": system,
            "logs": self.logs.stats(),
            "timestamp": Utc::now(),
        })))
    }

    pub fn logs_report(&self, params: &QueryParams) -> HandlerResult {
        let level = parse_level(params)?;
        let limit = parse_limit(params, self.admin.log_limit_default, self.admin.log_limit_max)?;

        let logs = self.logs.query(level, limit);
        Ok(Reply::ok(json!({
            "count": logs.len(),
            "logs": logs,
            "timestamp": Utc::now(),
        })))
    }

    pub fn requests_report(&self, params: &QueryParams) -> HandlerResult {
        let limit = parse_limit(params, self.admin.request_limit_default, self.admin.request_limit_max)?;

        let requests = self.metrics.recent(limit);
        Ok(Reply::ok(json!({
            "count": requests.len(),
            "requests": requests,
            "timestamp": Utc::now(),
        })))
    }

    /// Clear both stores. Requires `token` to match the configured secret.
    pub fn reset(&self, params: &QueryParams, request: &RequestInfo) -> HandlerResult {
        if let Err(err) = authorize_reset(params.get("token"), self.admin.reset_token.as_deref()) {
            tracing::warn!(path = %request.path, reason = %err.message, "Rejected monitor reset");
            return Err(err.into());
        }

        self.metrics.reset();
        self.logs.clear();

        let reset_by = request.forwarded_for.as_deref().unwrap_or("unknown");
        self.logs.info("Monitor reset", Some(log_metadata! { "resetBy" => reset_by }));
        tracing::info!(reset_by = %reset_by, "Monitor and logs reset");

        Ok(Reply::ok(json!({
            "message": "Monitor and logs reset successfully",
            "timestamp": Utc::now(),
        })))
    }

    pub fn summary(&self) -> HandlerResult {
        let system = self.snapshot()?;
        let stats = self.logs.stats();

        Ok(Reply::ok(json!({
            "message": "Monitoring endpoint",
            "availableActions": AVAILABLE_ACTIONS,
            "usage": {
                "metrics": "/api/monitor?action=metrics",
                "logs": "/api/monitor?action=logs&level=ERROR&limit=50",
                "requests": "/api/monitor?action=requests&limit=100",
                "reset": "/api/monitor?action=reset&token=YOUR_TOKEN",
            },
            "summary": {
                "system": {
                    "uptime": format_uptime(system.uptime_millis),
                    "memoryUsage": format!("{:.2}%", system.memory.percentage),
                    "totalRequests": system.requests.total,
                },
                "logs": {
                    "total": stats.total,
                    "errors": stats.errors,
                    "warnings": stats.warnings,
                },
            },
            "timestamp": Utc::now(),
        })))
    }

    /// 200 when healthy, 503 when degraded or when metrics are unavailable.
    /// Never fails.
    pub fn health(&self) -> Reply {
        match self.metrics.system_metrics() {
            Ok(system) => {
                let report = evaluate(&system);
                let status = if report.is_healthy() {
                    StatusCode::OK
                } else {
                    StatusCode::SERVICE_UNAVAILABLE
                };
                Reply::with_status(
                    status,
                    json!({
                        "status": report.status,
                        "service": self.service_name,
                        "reasons": report.reasons,
                        "uptimeMillis": system.uptime_millis,
                        "timestamp": Utc::now(),
                    }),
                )
            }
            Err(err) => {
                self.logs.error(
                    "Health check failed",
                    Some(ErrorInfo::from_error("MemoryProbeError", &err)),
                    None,
                );
                Reply::with_status(
                    StatusCode::SERVICE_UNAVAILABLE,
                    json!({
                        "status": "unhealthy",
                        "service": self.service_name,
                        "timestamp": Utc::now(),
                    }),
                )
            }
        }
    }

    fn snapshot(&self) -> Result<SystemMetrics, HandlerError> {
        self.metrics.system_metrics().map_err(HandlerError::internal)
    }
}

/// `Xd Yh`, `Xh Ym`, `Xm Ys` or `Xs`.
pub fn format_uptime(millis: u64) -> String {
    let seconds = millis / 1000;
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;

    if days > 0 {
        format!("{}d {}h", days, hours % 24)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes % 60)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds % 60)
    } else {
        format!("{}s", seconds)
    }
}
