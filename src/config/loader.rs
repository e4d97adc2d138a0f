//! Configuration loading from disk and environment.

use std::fs;

use thiserror::Error;

use crate::config::schema::{GatewayConfig, RouteConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("invalid value '{value}' for {key}")]
    Env { key: &'static str, value: String },
    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Upstreams known to the gateway when no explicit route table is configured:
/// (name, URL variable, inbound prefix, rewrite prefix, requires auth, websocket).
const DEFAULT_UPSTREAMS: &[(&str, &str, &str, &str, bool, bool)] = &[
    ("auth", "USER_SERVICE_URL", "/api/auth", "/auth", false, false),
    ("restaurants", "RESTAURANT_SERVICE_URL", "/api/restaurants", "/restaurants", true, false),
    ("orders", "ORDER_SERVICE_URL", "/api/orders", "/orders", true, false),
    ("payments", "PAYMENT_SERVICE_URL", "/api/payments", "/payments", true, false),
    ("notifications", "NOTIFICATION_SERVICE_URL", "/api/notifications", "/notifications", true, true),
];

/// Build the configuration from the process environment.
pub fn from_env() -> Result<GatewayConfig, ConfigError> {
    from_lookup(|key| std::env::var(key).ok())
}

/// Build the configuration from a variable lookup.
///
/// When `GATEWAY_CONFIG` names a TOML file it is read first; every variable
/// that is set overrides the corresponding file value. The default route table
/// is only used when the file declares no routes. Nothing is logged here, so
/// this can run before the subscriber is installed.
pub fn from_lookup<F>(lookup: F) -> Result<GatewayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match lookup("GATEWAY_CONFIG") {
        Some(path) => toml::from_str(&fs::read_to_string(path)?)?,
        None => GatewayConfig::default(),
    };

    if let Some(port) = lookup("PORT") {
        let port: u16 = parse("PORT", &port)?;
        config.listener.bind_address = format!("0.0.0.0:{}", port);
    }
    if let Some(secret) = lookup("JWT_SECRET") {
        config.auth.jwt_secret = secret;
    }

    if config.routes.is_empty() {
        for &(name, var, prefix, rewrite, requires_auth, websocket) in DEFAULT_UPSTREAMS {
            match lookup(var) {
                Some(upstream) if !upstream.is_empty() => config.routes.push(RouteConfig {
                    name: name.to_string(),
                    prefix: prefix.to_string(),
                    upstream,
                    rewrite_prefix: rewrite.to_string(),
                    requires_auth,
                    websocket,
                }),
                _ => config.disabled_routes.push(name.to_string()),
            }
        }
    }

    if let Some(v) = lookup("RATE_LIMIT_ENABLED") {
        config.rate_limit.enabled = parse("RATE_LIMIT_ENABLED", &v)?;
    }
    if let Some(v) = lookup("RATE_LIMIT_MAX_REQUESTS") {
        config.rate_limit.max_requests = parse("RATE_LIMIT_MAX_REQUESTS", &v)?;
    }
    if let Some(v) = lookup("RATE_LIMIT_WINDOW_SECS") {
        config.rate_limit.window_secs = parse("RATE_LIMIT_WINDOW_SECS", &v)?;
    }
    if let Some(v) = lookup("UPSTREAM_CONNECT_TIMEOUT_SECS") {
        config.timeouts.connect_secs = parse("UPSTREAM_CONNECT_TIMEOUT_SECS", &v)?;
    }
    if let Some(v) = lookup("UPSTREAM_TIMEOUT_SECS") {
        config.timeouts.upstream_secs = parse("UPSTREAM_TIMEOUT_SECS", &v)?;
    }
    if let Some(v) = lookup("REQUEST_TIMEOUT_SECS") {
        config.timeouts.request_secs = parse("REQUEST_TIMEOUT_SECS", &v)?;
    }
    if let Some(v) = lookup("MAX_BODY_SIZE") {
        config.security.max_body_size = parse("MAX_BODY_SIZE", &v)?;
    }
    if let Some(addr) = lookup("METRICS_ADDR") {
        config.observability.metrics_address = Some(addr);
    }
    if let Some(level) = lookup("LOG_LEVEL") {
        config.observability.log_level = level;
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

pub(crate) fn parse<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Env {
        key,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn builds_default_routes_from_service_urls() {
        let config = from_lookup(lookup(&[
            ("PORT", "3000"),
            ("JWT_SECRET", "secret"),
            ("USER_SERVICE_URL", "http://localhost:3001"),
            ("NOTIFICATION_SERVICE_URL", "http://localhost:3005"),
        ]))
        .unwrap();

        assert_eq!(config.listener.bind_address, "0.0.0.0:3000");
        assert_eq!(config.routes.len(), 2);
        assert_eq!(config.disabled_routes, vec!["restaurants", "orders", "payments"]);

        let auth = &config.routes[0];
        assert_eq!(auth.prefix, "/api/auth");
        assert_eq!(auth.rewrite_prefix, "/auth");
        assert!(!auth.requires_auth);

        let notifications = &config.routes[1];
        assert!(notifications.requires_auth);
        assert!(notifications.websocket);
    }

    #[test]
    fn overrides_limits_and_timeouts() {
        let config = from_lookup(lookup(&[
            ("JWT_SECRET", "secret"),
            ("RATE_LIMIT_MAX_REQUESTS", "5"),
            ("RATE_LIMIT_WINDOW_SECS", "10"),
            ("UPSTREAM_TIMEOUT_SECS", "3"),
            ("METRICS_ADDR", "127.0.0.1:9000"),
            ("LOG_LEVEL", "debug"),
        ]))
        .unwrap();

        assert_eq!(config.rate_limit.max_requests, 5);
        assert_eq!(config.rate_limit.window_secs, 10);
        assert_eq!(config.timeouts.upstream_secs, 3);
        assert_eq!(config.observability.metrics_address.as_deref(), Some("127.0.0.1:9000"));
        assert_eq!(config.observability.log_level, "debug");
    }

    #[test]
    fn missing_secret_is_rejected() {
        let err = from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref e) if e.contains(&ValidationError::MissingSecret)));
    }

    #[test]
    fn bad_number_is_reported() {
        let err = from_lookup(lookup(&[("JWT_SECRET", "s"), ("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Env { key: "PORT", .. }));
    }

    #[test]
    fn toml_routes_replace_defaults() {
        let toml = r#"
            [auth]
            jwt_secret = "from-file"

            [[routes]]
            name = "menu"
            prefix = "/menu"
            upstream = "http://127.0.0.1:4000"
            rewrite_prefix = "/"
            requires_auth = true
        "#;
        let config: GatewayConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.auth.jwt_secret, "from-file");
        assert_eq!(config.routes.len(), 1);
        assert!(config.routes[0].requires_auth);
        assert!(!config.routes[0].websocket);
        assert_eq!(config.rate_limit.max_requests, 100);
    }
}
