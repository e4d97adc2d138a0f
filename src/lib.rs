//! Food delivery API gateway and backing services.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod security;
pub mod services;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
