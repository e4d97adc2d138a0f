//! Upstream forwarding.
//!
//! One generic forwarder serves every route table entry. Bodies stream in
//! both directions; nothing is buffered. There are no retries: a failed
//! attempt becomes a 502 (or 504 on timeout) immediately.

use std::error::Error as StdError;
use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode, Version},
    response::Response,
};
use http_body_util::LengthLimitError;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::config::TimeoutConfig;
use crate::http::request::{is_upgrade_request, prepare_upstream_headers, strip_hop_by_hop};
use crate::http::response::GatewayError;
use crate::http::websocket;
use crate::routing::Route;

/// Pooled HTTP/1.1 client shared by all routes.
#[derive(Clone)]
pub struct UpstreamClient {
    client: Client<HttpConnector, Body>,
    response_timeout: Duration,
}

impl UpstreamClient {
    pub fn new(timeouts: &TimeoutConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(timeouts.connect_secs)));
        connector.set_nodelay(true);

        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self {
            client,
            response_timeout: Duration::from_secs(timeouts.upstream_secs),
        }
    }

    /// Forward `request` to the upstream of `route` and relay its response.
    ///
    /// Errors are only produced before any upstream response header has been
    /// relayed; once a response exists, body failures abort the client stream.
    pub async fn forward(
        &self,
        route: &Route,
        mut request: Request<Body>,
        client: Option<SocketAddr>,
    ) -> Result<Response, GatewayError> {
        let uri = route
            .upstream_uri(request.uri())
            .ok_or_else(|| GatewayError::Internal("Invalid upstream URI".to_string()))?;

        let upgrade = route.websocket && is_upgrade_request(request.headers());
        let on_client_upgrade = upgrade.then(|| hyper::upgrade::on(&mut request));

        let (mut parts, body) = request.into_parts();
        prepare_upstream_headers(&mut parts.headers, route.authority().as_str(), client, upgrade);
        parts.uri = uri;
        parts.version = Version::HTTP_11;
        let upstream_request = Request::from_parts(parts, body);

        let response = match tokio::time::timeout(
            self.response_timeout,
            self.client.request(upstream_request),
        )
        .await
        {
            Ok(Ok(response)) => response,
            Ok(Err(e)) if exceeded_body_limit(&e) => return Err(GatewayError::PayloadTooLarge),
            Ok(Err(e)) => return Err(GatewayError::Upstream(error_chain(&e))),
            Err(_) => return Err(GatewayError::UpstreamTimeout),
        };

        if let Some(on_client_upgrade) = on_client_upgrade {
            if response.status() == StatusCode::SWITCHING_PROTOCOLS {
                return Ok(websocket::tunnel(on_client_upgrade, response, route.name.clone()));
            }
        }

        let (mut parts, body) = response.into_parts();
        strip_hop_by_hop(&mut parts.headers, false);
        Ok(Response::from_parts(parts, Body::new(body)))
    }
}

/// True when the request body was cut off by the body size limit while
/// streaming; requests without `Content-Length` are only caught here.
fn exceeded_body_limit(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e.is::<LengthLimitError>() {
            return true;
        }
        current = e.source();
    }
    false
}

/// Flatten an error and its sources into one line for logs.
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
