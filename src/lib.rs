//! Site monitoring core: in-memory logs, request metrics, health evaluation
//! and the instrumentation that feeds them.

pub mod admin;
pub mod config;
pub mod error;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::schema::MonitorConfig;
pub use error::{AppError, ErrorKind, HandlerError};
pub use http::{AppState, HttpServer};
pub use lifecycle::Shutdown;
