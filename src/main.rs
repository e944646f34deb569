//! State gateway server binary.
//!
//! Loads the TOML configuration, wires the subsystems together and runs
//! the gateway until SIGINT or SIGTERM.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────┐
//!                      │                STATE GATEWAY                  │
//!                      │                                               │
//!   Client Request     │  ┌─────────┐   ┌──────────┐   ┌──────────┐  │
//!   ──────────────────▶│  │  http   │──▶│ routing  │──▶│ registry │  │
//!                      │  │ server  │   │dispatcher│   │  lookup  │  │
//!                      │  └─────────┘   └────┬─────┘   └────┬─────┘  │
//!                      │                     │              │         │
//!                      │     reserved paths  │              ▼         │
//!                      │     ┌───────────────┘        ┌──────────┐   │     Tenant
//!                      │     ▼                        │  proxy   │───┼───▶ Upstream
//!                      │  ┌──────────┐                │forwarder │   │
//!   Frontend ◀─────────┼──│ frontend │                └────┬─────┘   │
//!                      │  │passthrough                     │         │
//!                      │  └──────────┘                     ▼         │
//!   Client Response    │                             ┌──────────┐   │
//!   ◀──────────────────┼─────────────────────────────│  proxy   │   │
//!                      │                             │ rewriter │   │
//!                      │                             └──────────┘   │
//!                      │                                               │
//!                      │  config · observability · lifecycle          │
//!                      └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use state_gateway::config::load_config;
use state_gateway::http::GatewayServer;
use state_gateway::lifecycle::{listen_for_signals, Shutdown};
use state_gateway::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "state-gateway")]
#[command(about = "Multi-tenant reverse-proxy gateway for state portals", long_about = None)]
struct Args {
    /// Path to the gateway configuration file.
    #[arg(short, long, default_value = "gateway.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = load_config(&args.config)?;
    logging::init(&config.observability.log_level);

    tracing::info!("state-gateway v0.1.0 starting");
    tracing::info!(
        config = %args.config.display(),
        bind_address = %config.listener.bind_address,
        tenants = config.tenants.len(),
        frontend = %config.frontend.origin,
        idle_secs = config.timeouts.idle_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    tokio::spawn(listen_for_signals(shutdown.clone()));

    let server = GatewayServer::new(&config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
