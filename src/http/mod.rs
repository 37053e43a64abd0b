//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID + trace layers)
//!     → request.rs (request ID, method, path, forwarding headers)
//!     → params.rs (query validation)
//!     → middleware/instrument.rs (time, run handler, map failures)
//!         → admin/ (reporting views)
//!     → response.rs (JSON sink)
//!     → Send to client
//! ```

pub mod middleware;
pub mod params;
pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestInfo, UuidRequestId, X_REQUEST_ID};
pub use response::{HandlerResult, JsonSink, Reply, ResponseSink};
pub use server::{AppState, HttpServer};
