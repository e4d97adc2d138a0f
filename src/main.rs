//! Food delivery API gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────┐
//!                        │                   GATEWAY                    │
//!     Client Request     │  ┌──────────┐   ┌──────────┐   ┌──────────┐  │
//!     ───────────────────┼─▶│middleware│──▶│auth gate │──▶│  route   │  │
//!                        │  │  stack   │   │  (JWT)   │   │  table   │  │
//!                        │  └──────────┘   └──────────┘   └────┬─────┘  │
//!                        │                                     ▼        │
//!     Client Response    │                               ┌──────────┐   │      user-service
//!     ◀──────────────────┼───────────────────────────────│ upstream │◀──┼───── restaurant-service
//!                        │                               │  client  │   │      order-service
//!                        │                               └──────────┘   │
//!                        └──────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;

use food_gateway::config;
use food_gateway::lifecycle::{spawn_signal_listener, Shutdown};
use food_gateway::observability::{logging, metrics};
use food_gateway::HttpServer;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::from_env()?;
    logging::init(&config.observability.log_level);

    tracing::info!("food-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    for route in &config.disabled_routes {
        tracing::warn!(route = %route, "Upstream URL not set, route disabled");
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        routes = config.routes.len(),
        rate_limit_enabled = config.rate_limit.enabled,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if let Some(metrics_address) = &config.observability.metrics_address {
        match metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(metrics_address = %metrics_address, "Failed to parse metrics address"),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    spawn_signal_listener(shutdown.clone());

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
