//! Bearer token gate.
//!
//! Token validity is checked for every request that carries an
//! `Authorization` header. Presence is only required on routes flagged
//! `requires_auth`; that check happens after route lookup in the proxy
//! handler.

use axum::http::{header, HeaderMap};

use crate::http::response::GatewayError;
use crate::observability::metrics;
use crate::security::token::{Claims, TokenError, TokenKeys};

/// Verifies bearer tokens against the shared secret.
#[derive(Debug, Clone)]
pub struct AuthGate {
    keys: TokenKeys,
}

impl AuthGate {
    pub fn new(secret: &str) -> Self {
        Self {
            keys: TokenKeys::new(secret),
        }
    }

    /// Decode claims from the request headers.
    ///
    /// `Ok(None)` when no `Authorization` header is present. Any present but
    /// unusable header (wrong scheme, bad signature, expired) is an error.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Option<Claims>, GatewayError> {
        let Some(value) = headers.get(header::AUTHORIZATION) else {
            return Ok(None);
        };

        let token = value
            .to_str()
            .ok()
            .and_then(bearer_token)
            .ok_or_else(|| {
                metrics::record_auth_rejected("malformed");
                GatewayError::InvalidToken
            })?;

        match self.keys.verify(token) {
            Ok(claims) => Ok(Some(claims)),
            Err(err) => {
                let reason = match err {
                    TokenError::Expired => "expired",
                    TokenError::Invalid(_) => "invalid",
                };
                tracing::debug!(error = %err, "Token rejected");
                metrics::record_auth_rejected(reason);
                Err(GatewayError::InvalidToken)
            }
        }
    }

    /// Apply a route's policy to the outcome of [`authenticate`](Self::authenticate).
    pub fn require(claims: Option<&Claims>, requires_auth: bool) -> Result<(), GatewayError> {
        if requires_auth && claims.is_none() {
            metrics::record_auth_rejected("missing");
            return Err(GatewayError::MissingCredentials);
        }
        Ok(())
    }
}

fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
