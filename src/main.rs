//! API relay
//!
//! A lightweight reverse proxy in front of chat/LLM provider APIs.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────┐
//!                      │                    API RELAY                     │
//!                      │                                                  │
//!  Client Request      │  ┌─────────┐   ┌──────────┐   ┌──────────────┐   │
//!  ────────────────────┼─▶│  http   │──▶│ routing  │──▶│   security   │   │
//!                      │  │ server  │   │ resolver │   │ header filter│   │
//!                      │  └─────────┘   └──────────┘   └──────┬───────┘   │
//!                      │                                      │           │
//!                      │                                      ▼           │
//!  Client Response     │  ┌──────────┐  ┌──────────┐   ┌──────────────┐   │
//!  ◀───────────────────┼──│ rewrite  │◀─│ response │◀──│   upstream   │◀──┼── Provider API
//!                      │  │  (HTML)  │  │ decorate │   │    client    │   │
//!                      │  └──────────┘  └──────────┘   └──────────────┘   │
//!                      └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use api_relay::config::{self, ProxyConfig};
use api_relay::lifecycle::Shutdown;
use api_relay::observability::init_logging;
use api_relay::HttpServer;

#[derive(Parser)]
#[command(name = "api-relay")]
#[command(about = "Reverse proxy for chat/LLM provider APIs", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overriding the configuration file.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => ProxyConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
        config::validation::validate_config(&config)
            .map_err(config::ConfigError::Validation)?;
    }

    init_logging(&config.observability)?;

    tracing::info!("api-relay v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream_timeout_secs = config.timeouts.upstream_secs,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
