//! Backing CRUD services.
//!
//! # Data Flow
//! ```text
//! gateway (rewritten path)
//!     → users.rs        /auth/register, /auth/login
//!     → restaurants.rs  /restaurants, /restaurants/{id}/menu
//!     → orders.rs       /orders, /users/{userId}/orders
//!     → store.rs (in-memory documents)
//! ```
//!
//! Each service is an axum router built from explicit state, so the binaries
//! and the tests drive exactly the same code.

pub mod config;
pub mod error;
pub mod orders;
pub mod restaurants;
pub mod store;
pub mod users;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::Level;

pub use config::ServiceConfig;
pub use error::ServiceError;

/// Serve a service router until `shutdown` fires.
pub async fn serve(
    name: &'static str,
    listener: TcpListener,
    router: Router,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<(), std::io::Error> {
    tracing::info!(service = name, address = %listener.local_addr()?, "Service listening");

    let app = router
        .layer(TraceLayer::new_for_http().on_response(DefaultOnResponse::new().level(Level::INFO)))
        .layer(CorsLayer::permissive());

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            tracing::info!(service = name, "Shutdown signal received");
        })
        .await?;

    tracing::info!(service = name, "Service stopped");
    Ok(())
}

/// Log where documents live. `MONGO_URI` is accepted for compatibility only.
pub fn log_storage(name: &'static str, config: &ServiceConfig) {
    match &config.mongo_uri {
        Some(_) => tracing::info!(service = name, "MONGO_URI set; documents are kept in memory"),
        None => tracing::info!(service = name, "Using in-memory document store"),
    }
}
