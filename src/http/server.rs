//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the stores and the instrumentation layer from config
//! - Create the Axum router with the reporting routes
//! - Wire up middleware (request ID, tracing)
//! - Serve until the shutdown signal fires

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::admin::{setup_admin_router, Reporting};
use crate::config::MonitorConfig;
use crate::http::middleware::Instrumentation;
use crate::http::request::UuidRequestId;
use crate::lifecycle::shutdown::ShutdownSignal;
use crate::observability::logging::TracingSink;
use crate::observability::{LogStore, MemoryProbe, MemoryProbeError, MetricsStore, ProcessMemoryProbe};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub instrumentation: Instrumentation,
    pub reporting: Reporting,
}

impl AppState {
    /// State backed by this process's memory usage.
    pub fn from_config(config: &MonitorConfig) -> Result<Self, MemoryProbeError> {
        let probe = ProcessMemoryProbe::new()?;
        Ok(Self::with_probe(config, Arc::new(probe)))
    }

    pub fn with_probe(config: &MonitorConfig, probe: Arc<dyn MemoryProbe>) -> Self {
        let max_entries = config.observability.max_entries;
        let verbose = config.observability.verbose_for(config.runtime.mode);

        let logs = Arc::new(LogStore::new(max_entries).with_sink(Arc::new(TracingSink), verbose));
        let metrics = Arc::new(MetricsStore::new(max_entries, logs.clone(), probe));

        Self {
            instrumentation: Instrumentation::new(metrics.clone(), logs.clone(), config.runtime.mode),
            reporting: Reporting::new(
                logs,
                metrics,
                config.admin.clone(),
                config.runtime.service_name.clone(),
            ),
        }
    }

    pub fn logs(&self) -> &Arc<LogStore> {
        self.instrumentation.logs()
    }

    pub fn metrics(&self) -> &Arc<MetricsStore> {
        self.instrumentation.metrics()
    }
}

/// HTTP server for the monitoring API.
pub struct HttpServer {
    router: Router,
    config: MonitorConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: MonitorConfig) -> Result<Self, MemoryProbeError> {
        let state = AppState::from_config(&config)?;
        Ok(Self::with_state(config, state))
    }

    pub fn with_state(config: MonitorConfig, state: AppState) -> Self {
        let router = Self::build_router(state.clone());
        Self { router, config, state }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// The request ID is set by the outermost layer so the trace span and
    /// the handlers both see it.
    fn build_router(state: AppState) -> Router {
        setup_admin_router(state)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener, shutdown: ShutdownSignal) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            service = %self.config.runtime.service_name,
            mode = %self.config.runtime.mode,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The router with all layers applied.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AdminConfig;
    use crate::observability::{MemoryUsage, StaticMemoryProbe};
    use std::sync::atomic::{AtomicU64, Ordering};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    fn server() -> HttpServer {
        let config = MonitorConfig {
            admin: AdminConfig {
                reset_token: Some("token".into()),
                ..AdminConfig::default()
            },
            ..MonitorConfig::default()
        };
        let state = AppState::with_probe(&config, Arc::new(StaticMemoryProbe { used: 5, total: 100 }));
        HttpServer::with_state(config, state)
    }

    /// Memory reading out of 100 that a test can move.
    #[derive(Default)]
    struct AdjustableProbe(AtomicU64);

    impl MemoryProbe for AdjustableProbe {
        fn sample(&self) -> Result<MemoryUsage, MemoryProbeError> {
            MemoryUsage::new(self.0.load(Ordering::SeqCst), 100)
        }
    }

    async fn call(server: &HttpServer, method: &str, uri: &str) -> (StatusCode, Option<String>, Value) {
        let request = Request::builder().method(method).uri(uri).body(Body::empty()).unwrap();
        let response = server.router().oneshot(request).await.unwrap();
        let status = response.status();
        let id = response
            .headers()
            .get("x-request-id")
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, id, body)
    }

    #[tokio::test]
    async fn test_health_route() {
        let server = server();
        let (status, id, body) = call(&server, "GET", "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert!(id.is_some());
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "site-monitor");
    }

    #[tokio::test]
    async fn test_health_recovers_after_memory_pressure() {
        let config = MonitorConfig::default();
        let probe = Arc::new(AdjustableProbe::default());
        probe.0.store(95, Ordering::SeqCst);
        let server = HttpServer::with_state(config.clone(), AppState::with_probe(&config, probe.clone()));

        for _ in 0..100 {
            let (status, _, _) = call(&server, "GET", "/api/health").await;
            assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        }

        probe.0.store(10, Ordering::SeqCst);
        let (status, _, body) = call(&server, "GET", "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert!(body["reasons"].as_array().unwrap().is_empty());
        assert!(server.state().metrics().is_empty());
    }

    #[tokio::test]
    async fn test_request_id_reaches_log_line() {
        let server = server();
        let (_, id, _) = call(&server, "GET", "/api/monitor").await;
        let logs = server.state().logs().query(None, 10);
        let line = logs.iter().find(|e| e.message == "API Request").unwrap();
        assert_eq!(line.metadata.as_ref().unwrap()["requestId"], id.unwrap().as_str());
    }

    #[tokio::test]
    async fn test_unknown_route_is_instrumented() {
        let server = server();
        let (status, _, body) = call(&server, "GET", "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
        assert_eq!(body["path"], "/nope");

        let recent = server.state().metrics().recent(1);
        assert_eq!(recent[0].status_code, 404);
    }

    #[tokio::test]
    async fn test_wrong_method() {
        let server = server();
        let (status, _, body) = call(&server, "POST", "/api/monitor").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["code"], "NOT_FOUND");
        assert_eq!(server.state().metrics().recent(1)[0].method, "POST");
    }

    #[tokio::test]
    async fn test_validation_error_body() {
        let server = server();
        let (status, _, body) = call(&server, "GET", "/api/monitor?action=logs&limit=abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["path"], "/api/monitor");
        assert!(body["timestamp"].is_string());
    }
}
