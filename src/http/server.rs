//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the catch-all gateway handler
//! - Wire up middleware (panic catcher, request ID, CORS, body limit, rate
//!   limiter, tracing, timeout)
//! - Bind server to listener
//! - Apply the auth gate and route policy, then forward to the upstream

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::{DefaultOnResponse, TraceLayer},
    LatencyUnit,
};
use tracing::Level;

use crate::config::GatewayConfig;
use crate::http::proxy::UpstreamClient;
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::http::response::{panic_response, GatewayError};
use crate::observability::metrics;
use crate::routing::{RouteError, Router as ProxyRouter};
use crate::security::{rate_limit_middleware, AuthGate, RateLimiter};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<ProxyRouter>,
    pub auth: Arc<AuthGate>,
    pub upstream: UpstreamClient,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
    limiter: Arc<RateLimiter>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, RouteError> {
        let proxy_router = Arc::new(ProxyRouter::from_config(config.routes.clone())?);
        for route in proxy_router.routes() {
            tracing::info!(
                route = %route.name,
                prefix = route.prefix(),
                upstream = %route.authority(),
                requires_auth = route.requires_auth,
                websocket = route.websocket,
                "Route registered"
            );
        }

        let state = AppState {
            router: proxy_router,
            auth: Arc::new(AuthGate::new(&config.auth.jwt_secret)),
            upstream: UpstreamClient::new(&config.timeouts),
        };
        let limiter = Arc::new(RateLimiter::new(&config.rate_limit));

        let router = Self::build_router(&config, state, limiter.clone());
        Ok(Self {
            router,
            config,
            limiter,
        })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Layers listed first run first.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState, limiter: Arc<RateLimiter>) -> Router {
        Router::new()
            .route("/", any(proxy_handler))
            .route("/{*path}", any(proxy_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(CatchPanicLayer::custom(panic_response))
                    .layer(set_request_id_layer())
                    .layer(propagate_request_id_layer())
                    .layer(CorsLayer::permissive())
                    .layer(middleware::from_fn_with_state(limiter, rate_limit_middleware))
                    .layer(
                        TraceLayer::new_for_http()
                            .make_span_with(|req: &Request<Body>| {
                                tracing::info_span!(
                                    "request",
                                    method = %req.method(),
                                    path = %req.uri().path(),
                                    request_id = %request_id(req.headers()),
                                )
                            })
                            .on_response(
                                DefaultOnResponse::new()
                                    .level(Level::INFO)
                                    .latency_unit(LatencyUnit::Millis),
                            ),
                    )
                    .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
            )
    }

    /// The fully layered router, for driving the gateway without a socket.
    /// Requests without connection info are not rate limited.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        tokio::spawn(self.limiter.clone().run_sweeper(
            Duration::from_secs(self.config.rate_limit.sweep_interval_secs.max(1)),
            shutdown.resubscribe(),
        ));

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main gateway handler.
///
/// Order: token validity, route lookup, route policy, forward.
async fn proxy_handler(State(state): State<AppState>, mut request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(request.headers()).to_string();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    let claims = match state.auth.authenticate(request.headers()) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::warn!(request_id = %request_id, path = %path, "Rejected invalid token");
            metrics::record_request(&method, e.status().as_u16(), "none", start_time);
            return e.into_response();
        }
    };

    let Some(route) = state.router.match_path(&path) else {
        tracing::warn!(request_id = %request_id, path = %path, "No route matched");
        metrics::record_request(&method, 404, "none", start_time);
        return GatewayError::RouteNotFound.into_response();
    };

    if let Err(e) = AuthGate::require(claims.as_ref(), route.requires_auth) {
        tracing::warn!(request_id = %request_id, route = %route.name, "Missing credentials");
        metrics::record_request(&method, e.status().as_u16(), &route.name, start_time);
        return e.into_response();
    }

    if let Some(claims) = claims {
        tracing::debug!(request_id = %request_id, subject = %claims.subject_id, "Authenticated");
        request.extensions_mut().insert(claims);
    }

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        route = %route.name,
        "Proxying request"
    );

    match state.upstream.forward(route, request, client).await {
        Ok(response) => {
            metrics::record_request(&method, response.status().as_u16(), &route.name, start_time);
            response
        }
        Err(e) if !e.is_upstream_failure() => {
            tracing::warn!(request_id = %request_id, route = %route.name, error = %e, "Request rejected");
            metrics::record_request(&method, e.status().as_u16(), &route.name, start_time);
            e.into_response()
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                route = %route.name,
                upstream = %route.authority(),
                error = %e,
                "Upstream error"
            );
            metrics::record_upstream_error(&route.name);
            metrics::record_request(&method, e.status().as_u16(), &route.name, start_time);
            e.into_response()
        }
    }
}
