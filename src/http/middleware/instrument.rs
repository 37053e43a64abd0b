//! Request instrumentation.
//!
//! # Request States
//! ```text
//! PENDING ──handler Ok──▶ EMITTING ──▶ SENT
//!    │                       ▲
//!    └─handler Err/panic─▶ FAILED ──map_failure──┘
//! ```
//!
//! Every path goes through `Responder::finish`, which records the outcome,
//! writes the request log line and only then hands the body to the sink.
//! `finish` consumes the responder, so a request is recorded exactly once.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use axum::http::StatusCode;
use futures_util::FutureExt;
use serde_json::Value;

use crate::config::RuntimeMode;
use crate::error::{map_failure, ErrorBody, HandlerError};
use crate::http::request::RequestInfo;
use crate::http::response::{HandlerResult, ResponseSink};
use crate::log_metadata;
use crate::observability::{metrics, ErrorInfo, LogStore, MetricsStore, RequestOutcome};

/// Wraps handlers so every completed request is measured and logged.
#[derive(Clone)]
pub struct Instrumentation {
    metrics: Arc<MetricsStore>,
    logs: Arc<LogStore>,
    mode: RuntimeMode,
}

impl Instrumentation {
    pub fn new(metrics: Arc<MetricsStore>, logs: Arc<LogStore>, mode: RuntimeMode) -> Self {
        Self { metrics, logs, mode }
    }

    /// Start timing a request whose response will go to `sink`.
    pub fn begin<S: ResponseSink>(&self, request: RequestInfo, sink: S) -> Responder<S> {
        Responder {
            request,
            started: Instant::now(),
            sink,
            metrics: self.metrics.clone(),
            logs: self.logs.clone(),
        }
    }

    /// Run `handler` for `request` and emit its result (or its mapped
    /// failure) through `sink`. Panics inside the handler are caught and
    /// answered with a 500.
    pub async fn run<S, F, Fut>(&self, request: RequestInfo, sink: S, handler: F) -> S::Output
    where
        S: ResponseSink,
        F: FnOnce() -> Fut,
        Fut: Future<Output = HandlerResult>,
    {
        let responder = self.begin(request, sink);

        let result = AssertUnwindSafe(async move { handler().await })
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(HandlerError::Opaque(panic_message(payload.as_ref()))));

        match result {
            Ok(reply) => responder.finish(reply.status, reply.body),
            Err(failure) => {
                let (status, body) = self.resolve_failure(&failure, responder.request());
                let body = serde_json::to_value(&body).unwrap_or(Value::Null);
                responder.finish(status, body)
            }
        }
    }

    /// Map a failure to its response, logging unexpected ones in full.
    fn resolve_failure(&self, failure: &HandlerError, request: &RequestInfo) -> (StatusCode, ErrorBody) {
        match failure {
            HandlerError::App(err) => {
                tracing::debug!(path = %request.path, code = %err.kind, "Request rejected");
            }
            HandlerError::Internal(err) => {
                self.logs.error(
                    "Unhandled handler error",
                    Some(ErrorInfo::from_error(failure.name(), err.as_ref())),
                    Some(log_metadata! { "method" => request.method, "path" => request.path }),
                );
            }
            HandlerError::Opaque(message) => {
                self.logs.error(
                    "Handler aborted",
                    Some(ErrorInfo::new(failure.name(), message.clone())),
                    Some(log_metadata! { "method" => request.method, "path" => request.path }),
                );
            }
        }
        map_failure(failure, &request.path, self.mode)
    }

    pub fn metrics(&self) -> &Arc<MetricsStore> {
        &self.metrics
    }

    pub fn logs(&self) -> &Arc<LogStore> {
        &self.logs
    }
}

/// The emission point for one in-flight request.
pub struct Responder<S> {
    request: RequestInfo,
    started: Instant,
    sink: S,
    metrics: Arc<MetricsStore>,
    logs: Arc<LogStore>,
}

impl<S: ResponseSink> Responder<S> {
    pub fn request(&self) -> &RequestInfo {
        &self.request
    }

    /// Record the outcome and the request log line, then emit.
    pub fn finish(self, status: StatusCode, body: Value) -> S::Output {
        let elapsed = self.started.elapsed();
        let duration_millis = elapsed.as_millis() as u64;
        let request = self.request;

        self.metrics.record(RequestOutcome::new(
            request.path.clone(),
            request.method.clone(),
            status.as_u16(),
            duration_millis,
        ));

        let mut metadata = log_metadata! {
            "method" => request.method,
            "path" => request.path,
            "statusCode" => status.as_u16(),
            "duration" => format!("{}ms", duration_millis),
        };
        if let Some(id) = &request.request_id {
            metadata.insert("requestId".to_string(), Value::String(id.clone()));
        }
        self.logs.info("API Request", Some(metadata));
        metrics::record_request(&request.method, status.as_u16(), elapsed);

        self.sink.send(status, body)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
