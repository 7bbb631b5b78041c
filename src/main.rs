//! echoserver
//!
//! Reflects every inbound HTTP request back to the client as a JSON document.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ─────────────────▶ ┌──────────┐   ┌────────────┐   ┌──────────────────────────┐
//!                        │   http   │──▶│  request   │──▶│     reflect pipeline     │
//!                        │  server  │   │ id + body  │   │ scalars → headers → query│
//!                        └──────────┘   └────────────┘   │ → body → form → auth     │
//!                                                        │ → cookies                │
//!     Client Response                                    └────────────┬─────────────┘
//!     ◀───────────────── ┌──────────┐                                 │
//!                        │ response │◀──── metadata + JSON encode ◀───┘
//!                        └──────────┘
//!
//!     Cross-cutting: config (defaults → TOML → flags/env), observability
//!     (tracing, metrics), lifecycle (signals, graceful shutdown)
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use echoserver::config::{self, ConfigError, EchoConfig, LogFormat};
use echoserver::lifecycle::{signals, Shutdown};
use echoserver::observability::{logging, metrics};
use echoserver::HttpServer;

#[derive(Debug, Parser)]
#[command(name = "echoserver", version, about = "Reflects HTTP requests back as JSON")]
struct Cli {
    /// Optional TOML configuration file
    #[arg(short, long, env = "ECHOSERVER_CONFIG")]
    config: Option<PathBuf>,

    /// IP address/hostname to bind to
    #[arg(long, env = "SERVER_ADDR")]
    server_addr: Option<String>,

    /// Port to listen on
    #[arg(long, env = "SERVER_PORT")]
    server_port: Option<u16>,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum)]
    log_format: Option<LogFormat>,
}

/// Defaults, then the optional file, then flags and environment.
fn resolve_config(cli: &Cli) -> Result<EchoConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => EchoConfig::default(),
    };

    if let Some(addr) = &cli.server_addr {
        config.listener.server_addr = addr.clone();
    }
    if let Some(port) = cli.server_port {
        config.listener.server_port = port;
    }
    if let Some(format) = cli.log_format {
        config.observability.log_format = format;
    }

    config::validate_config(&config)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    logging::init_logging(&config.observability);
    logging::install_panic_hook();

    tracing::info!("echoserver v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.bind_address(),
        max_body_bytes = config.limits.max_body_bytes,
        request_timeout_secs = config.limits.request_timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics endpoint");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    tracing::debug!("server binding to address '{}'", config.bind_address());
    let listener = TcpListener::bind(config.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let trigger = shutdown.trigger_handle();
    tokio::spawn(async move {
        signals::terminate_requested().await;
        let _ = trigger.send(());
    });

    let server = HttpServer::new(config);
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
