//! Reporting surface.
//!
//! # Routes
//! ```text
//! GET /api/monitor?action=metrics|logs|requests|reset   (default: summary)
//! GET /api/health
//! ```
//!
//! `/api/monitor` and the 404/405 fallbacks run through the instrumentation
//! layer and are counted in the request window. `/api/health` is not, so its
//! own 503s never feed the failure threshold it reports on.

pub mod auth;
pub mod handlers;
pub mod reports;

use axum::{routing::get, Router};

use self::handlers::{health, method_not_allowed, monitor, not_found};
use crate::http::server::AppState;

pub use reports::{format_uptime, Reporting};

pub fn setup_admin_router(state: AppState) -> Router {
    Router::new()
        .route("/api/monitor", get(monitor).fallback(method_not_allowed))
        .route("/api/health", get(health).fallback(method_not_allowed))
        .fallback(not_found)
        .with_state(state)
}
