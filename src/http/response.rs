//! Response payloads and sinks.
//!
//! # Responsibilities
//! - Carry a handler's successful result (status + JSON body)
//! - Define the single emission point the instrumentation layer wraps
//! - Render emitted responses as axum JSON responses
//!
//! # Design Decisions
//! - `ResponseSink::send` consumes the sink, so a response is emitted at
//!   most once by construction
//! - Handlers return `Result<Reply, HandlerError>` instead of writing to a
//!   response object

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;

use crate::error::HandlerError;

/// A successful handler result.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
}

impl Reply {
    /// 200 with the given body.
    pub fn ok(body: Value) -> Self {
        Self::with_status(StatusCode::OK, body)
    }

    pub fn with_status(status: StatusCode, body: Value) -> Self {
        Self { status, body }
    }
}

pub type HandlerResult = Result<Reply, HandlerError>;

/// Where a finished response goes. Emitting consumes the sink.
pub trait ResponseSink {
    type Output;

    fn send(self, status: StatusCode, body: Value) -> Self::Output;
}

/// Renders the response as `application/json` for axum.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSink;

impl ResponseSink for JsonSink {
    type Output = Response;

    fn send(self, status: StatusCode, body: Value) -> Response {
        (status, Json(body)).into_response()
    }
}
