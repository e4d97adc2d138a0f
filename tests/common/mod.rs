//! Shared utilities for gateway integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, Uri},
    Json, Router,
};
use food_gateway::config::{GatewayConfig, RouteConfig};
use food_gateway::lifecycle::Shutdown;
use food_gateway::security::TokenKeys;
use food_gateway::HttpServer;
use serde_json::{json, Value};
use tokio::net::TcpListener;

pub const SECRET: &str = "integration-test-secret";

/// Serve `router` on an ephemeral port.
pub async fn spawn_router(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    addr
}

/// A mock upstream that answers every request with a JSON description of it.
pub struct EchoUpstream {
    pub addr: SocketAddr,
    hits: Arc<AtomicUsize>,
}

impl EchoUpstream {
    pub async fn start() -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let router = Router::new().fallback(echo).with_state(hits.clone());
        let addr = spawn_router(router).await;
        Self { addr, hits }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn echo(
    State(hits): State<Arc<AtomicUsize>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Json<Value> {
    hits.fetch_add(1, Ordering::SeqCst);
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string);
    Json(json!({
        "method": method.as_str(),
        "path": uri.path(),
        "query": uri.query(),
        "host": header("host"),
        "authorization": header("authorization"),
        "x_forwarded_for": header("x-forwarded-for"),
        "x_request_id": header("x-request-id"),
        "body": String::from_utf8_lossy(&body),
    }))
}

pub fn route(name: &str, prefix: &str, upstream: String, rewrite: &str, requires_auth: bool) -> RouteConfig {
    RouteConfig {
        name: name.to_string(),
        prefix: prefix.to_string(),
        upstream,
        rewrite_prefix: rewrite.to_string(),
        requires_auth,
        websocket: false,
    }
}

/// Gateway config with the given routes, a known secret and no rate limit.
pub fn gateway_config(routes: Vec<RouteConfig>) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.auth.jwt_secret = SECRET.to_string();
    config.rate_limit.enabled = false;
    config.timeouts.connect_secs = 1;
    config.timeouts.upstream_secs = 5;
    config.routes = routes;
    config
}

/// A running gateway. It shuts down when the handle is dropped.
pub struct TestGateway {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
}

impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

pub async fn spawn_gateway(config: GatewayConfig) -> TestGateway {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });
    TestGateway { addr, shutdown }
}

pub fn token() -> String {
    TokenKeys::new(SECRET)
        .issue("64f0c0ffee64f0c0ffee64f0c0ffee00", "alice@example.com", chrono::Duration::hours(1))
        .unwrap()
}

pub fn expired_token() -> String {
    TokenKeys::new(SECRET)
        .issue("64f0c0ffee64f0c0ffee64f0c0ffee00", "alice@example.com", chrono::Duration::hours(-1))
        .unwrap()
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
