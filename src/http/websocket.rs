//! Upgrade (websocket) tunneling.
//!
//! # Data Flow
//! ```text
//! Client ←──── upgraded bytes ────→ Gateway ←──── upgraded bytes ────→ Upstream
//! ```
//!
//! The handshake itself goes through the normal forwarder. When the upstream
//! answers `101 Switching Protocols`, that response is relayed to the client
//! and a task joins both upgraded connections with a bidirectional copy.
//! Frames are not parsed; close and ping/pong pass through as bytes.

use axum::{body::Body, response::Response};
use hyper::{body::Incoming, upgrade::OnUpgrade};
use hyper_util::rt::TokioIo;

/// Relay the upstream's 101 and splice the two upgraded connections.
pub fn tunnel(on_client: OnUpgrade, mut upstream: Response<Incoming>, route: String) -> Response {
    let on_upstream = hyper::upgrade::on(&mut upstream);

    tokio::spawn(async move {
        let (client, server) = match tokio::try_join!(on_client, on_upstream) {
            Ok(pair) => pair,
            Err(e) => {
                tracing::warn!(route = %route, error = %e, "Upgrade failed");
                return;
            }
        };

        let mut client = TokioIo::new(client);
        let mut server = TokioIo::new(server);
        match tokio::io::copy_bidirectional(&mut client, &mut server).await {
            Ok((to_upstream, to_client)) => {
                tracing::debug!(route = %route, to_upstream, to_client, "Tunnel closed");
            }
            Err(e) => {
                tracing::debug!(route = %route, error = %e, "Tunnel aborted");
            }
        }
    });

    let (parts, _) = upstream.into_parts();
    Response::from_parts(parts, Body::empty())
}
