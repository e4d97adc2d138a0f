//! Restaurant service.

use food_gateway::lifecycle::{spawn_signal_listener, Shutdown};
use food_gateway::observability::logging;
use food_gateway::services::{self, restaurants, ServiceConfig};
use tokio::net::TcpListener;

const NAME: &str = "restaurant-service";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServiceConfig::from_env(3002)?;
    logging::init(&config.log_level);
    tracing::info!(?config, "{} v{} starting", NAME, env!("CARGO_PKG_VERSION"));
    services::log_storage(NAME, &config);

    let state = restaurants::RestaurantState::new();

    let listener = TcpListener::bind(config.bind_address()).await?;

    let shutdown = Shutdown::new();
    spawn_signal_listener(shutdown.clone());

    services::serve(NAME, listener, restaurants::router(state), shutdown.subscribe()).await?;
    Ok(())
}
