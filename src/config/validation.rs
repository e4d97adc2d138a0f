//! Configuration validation.
//!
//! Serde handles syntax; this module checks semantics and reports every
//! problem at once rather than stopping at the first.

use std::collections::HashSet;

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("JWT secret must not be empty")]
    MissingSecret,
    #[error("invalid bind address '{0}'")]
    BindAddress(String),
    #[error("route '{route}': prefix '{prefix}' must start with '/' and not end with '/'")]
    Prefix { route: String, prefix: String },
    #[error("route '{route}': rewrite prefix '{rewrite}' must start with '/'")]
    Rewrite { route: String, rewrite: String },
    #[error("route '{route}': upstream '{upstream}' is not an http URL")]
    Upstream { route: String, upstream: String },
    #[error("duplicate route prefix '{0}'")]
    DuplicatePrefix(String),
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Validate a configuration, returning all errors found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.auth.jwt_secret.is_empty() {
        errors.push(ValidationError::MissingSecret);
    }

    if config
        .listener
        .bind_address
        .parse::<std::net::SocketAddr>()
        .is_err()
    {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    let mut seen = HashSet::new();
    for route in &config.routes {
        if !route.prefix.starts_with('/') || (route.prefix.len() > 1 && route.prefix.ends_with('/')) {
            errors.push(ValidationError::Prefix {
                route: route.name.clone(),
                prefix: route.prefix.clone(),
            });
        }
        if !route.rewrite_prefix.starts_with('/') {
            errors.push(ValidationError::Rewrite {
                route: route.name.clone(),
                rewrite: route.rewrite_prefix.clone(),
            });
        }
        let upstream_ok = Url::parse(&route.upstream)
            .map(|u| u.scheme() == "http" && u.host_str().is_some())
            .unwrap_or(false);
        if !upstream_ok {
            errors.push(ValidationError::Upstream {
                route: route.name.clone(),
                upstream: route.upstream.clone(),
            });
        }
        if !seen.insert(route.prefix.as_str()) {
            errors.push(ValidationError::DuplicatePrefix(route.prefix.clone()));
        }
    }

    if config.rate_limit.enabled {
        if config.rate_limit.max_requests == 0 {
            errors.push(ValidationError::Zero("rate_limit.max_requests"));
        }
        if config.rate_limit.window_secs == 0 {
            errors.push(ValidationError::Zero("rate_limit.window_secs"));
        }
    }
    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.upstream_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
