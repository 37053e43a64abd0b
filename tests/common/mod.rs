//! Shared utilities for integration and load testing.

use std::net::SocketAddr;
use std::sync::Arc;

use site_monitor::config::{AdminConfig, MonitorConfig};
use site_monitor::lifecycle::Shutdown;
use site_monitor::observability::StaticMemoryProbe;
use site_monitor::{AppState, HttpServer};
use tokio::net::TcpListener;

pub const RESET_TOKEN: &str = "integration-token";

/// A monitor running on an ephemeral port.
pub struct TestMonitor {
    pub addr: SocketAddr,
    pub state: AppState,
    pub shutdown: Shutdown,
}

#[allow(dead_code)]
impl TestMonitor {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestMonitor {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub fn test_config() -> MonitorConfig {
    MonitorConfig {
        admin: AdminConfig {
            reset_token: Some(RESET_TOKEN.to_string()),
            ..AdminConfig::default()
        },
        ..MonitorConfig::default()
    }
}

/// Start a monitor whose memory probe always reports `used` of 100 units.
pub async fn start_monitor(config: MonitorConfig, used: u64) -> TestMonitor {
    let state = AppState::with_probe(&config, Arc::new(StaticMemoryProbe { used, total: 100 }));
    let server = HttpServer::with_state(config, state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, signal).await;
    });

    TestMonitor { addr, state, shutdown }
}
