//! rpaas-blocks: configuration block API for reverse proxy instances.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request        ┌──────────────────────────────────────────────┐
//!     ──────────────────────┼─▶ http (axum router, request id, timeouts)   │
//!                           │        │                                     │
//!                           │        ▼                                     │
//!                           │   blocks::service ──▶ validator (generic)    │
//!                           │        │         └──▶ naming (lua)           │
//!                           │        ▼                                     │
//!                           │   blocks::store (per-instance, keyed)        │
//!                           │                                              │
//!                           │   config · observability · lifecycle         │
//!                           └──────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;

use rpaas_blocks::config::{load_config, ServiceConfig};
use rpaas_blocks::lifecycle::{signals, startup, Shutdown};
use rpaas_blocks::observability::logging;

#[derive(Parser)]
#[command(name = "rpaas-blocks")]
#[command(about = "Configuration block API for reverse proxy instances", long_about = None)]
struct Args {
    /// Path to the TOML configuration file (defaults are used when omitted).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "rpaas-blocks starting");

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    startup::run(config, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
