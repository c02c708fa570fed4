//! Startup orchestration.
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Metrics exporter starts before the listener
//! - Listener binds last (traffic only when ready)

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::ServiceConfig;
use crate::http::HttpServer;
use crate::lifecycle::shutdown::ShutdownSignal;
use crate::observability::metrics;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Start all subsystems and serve until `shutdown` fires.
pub async fn run(config: ServiceConfig, shutdown: ShutdownSignal) -> Result<(), StartupError> {
    tracing::info!(
        bind_address = %config.listener.bind_address,
        instances = config.store.instances.len(),
        store_timeout_secs = config.timeouts.store_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: config.listener.bind_address.clone(),
            source,
        })?;

    let server = HttpServer::from_config(config);
    server.run(listener, shutdown).await?;
    Ok(())
}
