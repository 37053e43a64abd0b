//! Request-level error taxonomy and the mapping from handler failures to
//! structured response bodies.

use std::error::Error as StdError;
use std::fmt;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::RuntimeMode;

/// Machine-readable error code carried in every error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Caller input malformed (400).
    ValidationError,
    /// Unexpected failure (500).
    InternalError,
    /// Unknown route or unsupported method (404/405).
    NotFound,
    /// Reserved; nothing raises it yet.
    RateLimit,
    /// Missing or wrong credential (401).
    Unauthorized,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ValidationError => "VALIDATION_ERROR",
            ErrorKind::InternalError => "INTERNAL_ERROR",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::RateLimit => "RATE_LIMIT",
            ErrorKind::Unauthorized => "UNAUTHORIZED",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure detected by a handler. Terminal: it becomes the response.
#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
    pub status: StatusCode,
    pub details: Option<Value>,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, status: StatusCode) -> Self {
        Self {
            kind,
            message: message.into(),
            status,
            details: None,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ValidationError, message, StatusCode::BAD_REQUEST)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message, StatusCode::UNAUTHORIZED)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message, StatusCode::NOT_FOUND)
    }

    pub fn method_not_allowed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message, StatusCode::METHOD_NOT_ALLOWED)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RateLimit, message, StatusCode::TOO_MANY_REQUESTS)
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Everything a handler can fail with.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// A classified failure; rendered verbatim.
    #[error(transparent)]
    App(#[from] AppError),

    /// An unexpected error; detail disclosed only in development.
    #[error("{0}")]
    Internal(Box<dyn StdError + Send + Sync>),

    /// A failure with no error value, such as a panic payload.
    #[error("handler aborted: {0}")]
    Opaque(String),
}

impl HandlerError {
    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        HandlerError::Internal(err.into())
    }

    /// Name recorded in the ERROR log entry.
    pub fn name(&self) -> &'static str {
        match self {
            HandlerError::App(_) => "AppError",
            HandlerError::Internal(_) => "InternalError",
            HandlerError::Opaque(_) => "Panic",
        }
    }
}

/// JSON body sent for every failed request.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub code: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    pub timestamp: DateTime<Utc>,
    pub path: String,
}

/// Convert a handler failure into a status and body, stamping the request
/// path and the current time.
pub fn map_failure(failure: &HandlerError, path: &str, mode: RuntimeMode) -> (StatusCode, ErrorBody) {
    let (status, code, message, details) = match failure {
        HandlerError::App(err) => (err.status, err.kind, err.message.clone(), err.details.clone()),
        HandlerError::Internal(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::InternalError,
            "An unexpected error occurred".to_string(),
            mode.is_development().then(|| Value::String(err.to_string())),
        ),
        HandlerError::Opaque(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::InternalError,
            "An unknown error occurred".to_string(),
            None,
        ),
    };

    (
        status,
        ErrorBody {
            code,
            message,
            details,
            timestamp: Utc::now(),
            path: path.to_string(),
        },
    )
}
