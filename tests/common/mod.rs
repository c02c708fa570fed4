//! Shared utilities for integration tests.

use std::net::SocketAddr;
use tokio::net::TcpListener;

use rpaas_blocks::config::ServiceConfig;
use rpaas_blocks::http::{AppState, HttpServer};
use rpaas_blocks::lifecycle::Shutdown;

/// A block API server running on an ephemeral port.
pub struct TestServer {
    pub base_url: String,
    pub shutdown: Shutdown,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a server with the given instances provisioned in an in-memory store.
#[allow(dead_code)]
pub async fn start_server(instances: &[&str]) -> TestServer {
    let mut config = ServiceConfig::default();
    config.store.instances = instances.iter().map(|i| i.to_string()).collect();
    let state = AppState::from_config(&config);
    start_server_with_state(config, state).await
}

/// Start a server backed by a caller-provided state.
#[allow(dead_code)]
pub async fn start_server_with_state(config: ServiceConfig, state: AppState) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, state);
    let signal = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, signal).await;
    });

    TestServer {
        base_url: format!("http://{}", addr),
        shutdown,
    }
}
