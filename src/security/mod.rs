//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → rate_limit.rs (per-IP fixed window)
//!     → auth.rs (bearer token validity, route policy)
//!     → Pass to proxy
//! ```
//!
//! Tokens are issued by the user service and verified by the gateway with the
//! same `token.rs` keys.

pub mod auth;
pub mod rate_limit;
pub mod token;

pub use auth::AuthGate;
pub use rate_limit::{rate_limit_middleware, RateLimiter};
pub use token::{Claims, TokenKeys};
