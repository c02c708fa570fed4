//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the block handlers
//! - Wire up middleware (tracing, timeouts, body limit, request ID)
//! - Bind server to listener and serve until shutdown

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::blocks::service::BlockService;
use crate::blocks::store::InMemoryBlockStore;
use crate::blocks::validator::NginxSyntaxValidator;
use crate::config::ServiceConfig;
use crate::http::handlers::*;
use crate::http::request::MakeRequestUuid;
use crate::lifecycle::ShutdownSignal;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub blocks: BlockService,
}

impl AppState {
    pub fn new(blocks: BlockService) -> Self {
        Self { blocks }
    }

    /// State backed by an in-memory store holding the configured instances.
    pub fn from_config(config: &ServiceConfig) -> Self {
        let store = InMemoryBlockStore::with_instances(config.store.instances.iter().cloned());
        tracing::info!(instances = store.instance_count(), "Block store initialized");

        Self::new(BlockService::new(
            Arc::new(store),
            Arc::new(NginxSyntaxValidator),
            Duration::from_secs(config.timeouts.store_secs),
        ))
    }
}

/// HTTP server for the block API.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and state.
    pub fn new(config: ServiceConfig, state: AppState) -> Self {
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Create a server whose state is built from the configuration.
    pub fn from_config(config: ServiceConfig) -> Self {
        let state = AppState::from_config(&config);
        Self::new(config, state)
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        Router::new()
            .route("/healthcheck", get(healthcheck))
            .route("/resources/{instance}/block", get(list_blocks).post(update_block))
            .route("/resources/{instance}/block/{block}", delete(delete_block))
            .route(
                "/resources/{instance}/lua",
                get(list_lua_blocks).post(update_lua_block).delete(delete_lua_block),
            )
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The router, for serving or driving in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until a shutdown signal is received.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            request_timeout_secs = self.config.timeouts.request_secs,
            "HTTP server starting"
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::http::request::X_REQUEST_ID;

    fn test_router() -> Router {
        let mut config = ServiceConfig::default();
        config.store.instances = vec!["my-instance".to_string()];
        HttpServer::from_config(config).router()
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    fn json_request(method: Method, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn form_request(method: Method, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_update_then_list() {
        let router = test_router();

        let (status, body) = send(
            &router,
            json_request(
                Method::POST,
                "/resources/my-instance/block",
                r#"{"name": "server-block", "content": "server { listen 80; }"}"#,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());

        let (status, body) = send(&router, get_request("/resources/my-instance/block")).await;
        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            json,
            json!({"blocks": [{"name": "server-block", "content": "server { listen 80; }"}]})
        );
    }

    #[tokio::test]
    async fn test_empty_listings_are_arrays() {
        let router = test_router();

        let (_, body) = send(&router, get_request("/resources/my-instance/block")).await;
        assert_eq!(body, br#"{"blocks":[]}"#);

        let (_, body) = send(&router, get_request("/resources/my-instance/lua")).await;
        assert_eq!(body, br#"{"modules":[]}"#);
    }

    #[tokio::test]
    async fn test_update_rejects_empty_and_malformed_body() {
        let router = test_router();

        let (status, body) = send(&router, json_request(Method::POST, "/resources/my-instance/block", "")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "Request body can't be empty");

        let (status, _) = send(&router, json_request(Method::POST, "/resources/my-instance/block", "{")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_rejects_invalid_syntax() {
        let router = test_router();

        let (status, body) = send(
            &router,
            json_request(
                Method::POST,
                "/resources/my-instance/block",
                r#"{"name": "server", "content": "location / {"}"#,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert!(json["message"].as_str().unwrap().starts_with("line 1: unexpected end of file"));

        let (_, body) = send(&router, get_request("/resources/my-instance/block")).await;
        assert_eq!(body, br#"{"blocks":[]}"#);
    }

    #[tokio::test]
    async fn test_lua_lifecycle() {
        let router = test_router();

        let (status, _) = send(
            &router,
            form_request(
                Method::POST,
                "/resources/my-instance/lua",
                "lua_module_type=server&content=ngx.say(%22hi%22)",
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(&router, get_request("/resources/my-instance/lua")).await;
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, json!({"modules": [{"lua_name": "lua-server", "content": "ngx.say(\"hi\")"}]}));

        let (status, _) = send(
            &router,
            form_request(Method::DELETE, "/resources/my-instance/lua", "lua_module_type=server"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(&router, get_request("/resources/my-instance/lua")).await;
        assert_eq!(body, br#"{"modules":[]}"#);
    }

    #[tokio::test]
    async fn test_delete_lua_requires_module_type() {
        let router = test_router();

        let (status, body) = send(
            &router,
            form_request(Method::DELETE, "/resources/my-instance/lua", "content=x"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "missing required field \"lua_module_type\"");

        let request = Request::builder()
            .method(Method::DELETE)
            .uri("/resources/my-instance/lua")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&router, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_block_with_server_scope() {
        let router = test_router();

        let (status, _) = send(
            &router,
            json_request(
                Method::POST,
                "/resources/my-instance/block",
                r#"{"name": "server", "content": "return 200;", "server_name": "example.org"}"#,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let delete = |uri: &str| Request::builder().method(Method::DELETE).uri(uri).body(Body::empty()).unwrap();

        let (status, _) = send(&router, delete("/resources/my-instance/block/server")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&router, delete("/resources/my-instance/block/server?server_name=example.org")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_instance_is_not_found() {
        let router = test_router();
        let (status, body) = send(&router, get_request("/resources/ghost/block")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "rpaas instance \"ghost\" not found");
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let router = test_router();

        let response = router.clone().oneshot(get_request("/healthcheck")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(X_REQUEST_ID));

        let request = Request::builder()
            .uri("/healthcheck")
            .header(X_REQUEST_ID, "abc-123")
            .body(Body::empty())
            .unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.headers()[X_REQUEST_ID], "abc-123");
    }
}
