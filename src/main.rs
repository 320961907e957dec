//! WebGIS feature-info gateway.
//!
//! Lets a logged-in browser ask one configured WMS server for
//! `GetFeatureInfo` data without exposing the upstream or letting the
//! browser steer the server's outbound requests.
//!
//! # Architecture Overview
//!
//! ```text
//!     Browser                      ┌──────────────────────────────────────────────┐
//!     ─────────────────────────────┼─▶ session gate ─▶ validator ─▶ fetcher ──────┼──▶ WMS
//!                                  │                                   │          │   upstream
//!     ◀────────────────────────────┼──────────────── relay ◀───────────┘          │
//!                                  │                                              │
//!                                  │  config · logging · metrics · lifecycle      │
//!                                  └──────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

use webgis_gateway::config::{load_config, GatewayConfig};
use webgis_gateway::lifecycle::{self, signals, Shutdown};
use webgis_gateway::observability::logging;

#[derive(Parser, Debug)]
#[command(name = "webgis-gateway", version)]
#[command(about = "Authenticated WMS GetFeatureInfo gateway", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Listen port (keeps the configured bind host).
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Upstream WMS base URL; defines the allowlist.
    #[arg(long, env = "WMS_BASE_URL")]
    wms_base_url: Option<String>,

    /// Default WMS layer for the map client.
    #[arg(long, env = "WMS_LAYER")]
    wms_layer: Option<String>,

    /// WMS server flavour tag.
    #[arg(long, env = "WMS_SERVER_TYPE")]
    wms_server_type: Option<String>,

    /// Log level when RUST_LOG is unset.
    #[arg(long, env = "LOG_LEVEL")]
    log_level: Option<String>,
}

/// A command-line override that cannot be applied to the loaded config.
#[derive(Debug, Error)]
enum CliError {
    #[error("cannot apply port {port}: listener.bind_address '{address}' is not a socket address")]
    PortOverride { port: u16, address: String },
}

impl Cli {
    fn apply(self, config: &mut GatewayConfig) -> Result<(), CliError> {
        if let Some(port) = self.port {
            let address = &config.listener.bind_address;
            let mut addr: SocketAddr = address.parse().map_err(|_| CliError::PortOverride {
                port,
                address: address.clone(),
            })?;
            addr.set_port(port);
            config.listener.bind_address = addr.to_string();
        }
        if let Some(url) = self.wms_base_url {
            config.wms.base_url = url;
        }
        if let Some(layer) = self.wms_layer {
            config.wms.layer = layer;
        }
        if let Some(server_type) = self.wms_server_type {
            config.wms.server_type = server_type;
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };
    cli.apply(&mut config)?;

    logging::init(&config.observability.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "webgis-gateway starting");

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(&shutdown);

    if let Err(e) = lifecycle::run(config, shutdown).await {
        tracing::error!(error = %e, "Gateway failed");
        return Err(e.into());
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
