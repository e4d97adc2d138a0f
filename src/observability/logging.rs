//! Structured logging.
//!
//! Every binary calls [`init`] once at startup. `RUST_LOG` wins when set;
//! otherwise the configured level applies to this crate and to tower-http's
//! request spans.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the global tracing subscriber.
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("food_gateway={level},user_service={level},restaurant_service={level},order_service={level},tower_http={level}", level = default_level).into()
    });

    // A second init (e.g. from tests) is harmless.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
