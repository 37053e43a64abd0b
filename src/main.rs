//! Site monitor
//!
//! Serves the monitoring API over the in-process log and metrics stores.
//!
//! ```text
//!     Client Request
//!     ─────────────▶ request ID ─▶ trace ─▶ instrumentation ─▶ reporting handlers
//!                                               │                   │
//!                                               ▼                   ▼
//!                                          MetricsStore ◀──── LogStore ──▶ tracing
//!                                               │
//!                                               ▼
//!                                        HealthEvaluator
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use site_monitor::config::{load_config, load_from_env};
use site_monitor::lifecycle::{signals, Shutdown};
use site_monitor::observability::{logging, metrics};
use site_monitor::HttpServer;

#[derive(Parser)]
#[command(name = "site-monitor")]
#[command(about = "In-process request monitoring and health API", long_about = None)]
struct Args {
    /// TOML config file. Defaults plus environment overrides when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => load_from_env()?,
    };

    logging::init_tracing(&config.observability)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        mode = %config.runtime.mode,
        max_entries = config.observability.max_entries,
        reset_enabled = config.admin.reset_token.is_some(),
        "Configuration loaded"
    );

    if config.observability.prometheus_enabled {
        match config.observability.prometheus_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(err) => tracing::error!(
                prometheus_address = %config.observability.prometheus_address,
                error = %err,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    signals::install(shutdown.clone());

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
