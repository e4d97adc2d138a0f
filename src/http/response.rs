//! Gateway error responses.
//!
//! Auth failures answer `{"message": ...}`; everything else the gateway
//! produces itself answers `{"error": ...}`. Upstream responses are relayed
//! untouched and never pass through here.

use std::time::Duration;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub const INVALID_TOKEN: &str = "Invalid or expired token";
pub const AUTH_REQUIRED: &str = "Authentication required";
pub const PROXY_ERROR: &str = "Proxy error";
pub const NOT_FOUND: &str = "Not found";
pub const PAYLOAD_TOO_LARGE: &str = "Payload too large";
pub const RATE_LIMITED: &str = "Too many requests, please try again later.";

/// Every way the gateway can answer a request without relaying an upstream response.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid bearer token")]
    InvalidToken,
    #[error("missing credentials for protected route")]
    MissingCredentials,
    #[error("no route for path")]
    RouteNotFound,
    #[error("rate limit exceeded")]
    RateLimited { retry_after: Duration },
    #[error("request body exceeds the size limit")]
    PayloadTooLarge,
    #[error("upstream request failed: {0}")]
    Upstream(String),
    #[error("upstream did not answer in time")]
    UpstreamTimeout,
    #[error("{0}")]
    Internal(String),
}

impl GatewayError {
    /// True when the upstream, not the client, caused the failure.
    pub fn is_upstream_failure(&self) -> bool {
        matches!(self, GatewayError::Upstream(_) | GatewayError::UpstreamTimeout)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::InvalidToken | GatewayError::MissingCredentials => StatusCode::UNAUTHORIZED,
            GatewayError::RouteNotFound => StatusCode::NOT_FOUND,
            GatewayError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::Upstream(_) => StatusCode::BAD_GATEWAY,
            GatewayError::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            GatewayError::InvalidToken => json!({ "message": INVALID_TOKEN }),
            GatewayError::MissingCredentials => json!({ "message": AUTH_REQUIRED }),
            GatewayError::RouteNotFound => json!({ "error": NOT_FOUND }),
            GatewayError::RateLimited { .. } => json!({ "error": RATE_LIMITED }),
            GatewayError::PayloadTooLarge => json!({ "error": PAYLOAD_TOO_LARGE }),
            GatewayError::Upstream(_) | GatewayError::UpstreamTimeout => json!({ "error": PROXY_ERROR }),
            GatewayError::Internal(message) => json!({ "error": message }),
        };

        let mut response = (status, Json(body)).into_response();
        if let GatewayError::RateLimited { retry_after } = self {
            // Round up so clients never retry inside the window.
            let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs.max(1)));
        }
        response
    }
}

/// Body for panics caught by the outermost layer.
pub fn panic_response(err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Internal server error".to_string()
    };
    tracing::error!(error = %message, "Handler panicked");
    GatewayError::Internal(message).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn auth_errors_use_message_key() {
        let response = GatewayError::InvalidToken.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await, json!({ "message": INVALID_TOKEN }));
    }

    #[tokio::test]
    async fn proxy_errors_hide_detail() {
        let response = GatewayError::Upstream("connection refused".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(body_json(response).await, json!({ "error": PROXY_ERROR }));
    }

    #[tokio::test]
    async fn rate_limited_sets_retry_after() {
        let response = GatewayError::RateLimited {
            retry_after: Duration::from_millis(12_300),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "13");
    }

    #[tokio::test]
    async fn oversized_body_is_a_client_error() {
        let err = GatewayError::PayloadTooLarge;
        assert!(!err.is_upstream_failure());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body_json(response).await, json!({ "error": PAYLOAD_TOO_LARGE }));
    }

    #[test]
    fn panic_payload_becomes_message() {
        let response = panic_response(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
