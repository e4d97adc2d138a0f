//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID, hop-by-hop stripping, X-Forwarded-*)
//!     → [auth gate + route table decide the upstream]
//!     → proxy.rs (stream to the upstream, relay its response)
//!     → websocket.rs (splice upgraded connections)
//!     → response.rs (gateway-generated error bodies)
//! ```

pub mod proxy;
pub mod request;
pub mod response;
pub mod server;
pub mod websocket;

pub use request::X_REQUEST_ID;
pub use response::GatewayError;
pub use server::HttpServer;
