//! Routing and authentication through a live gateway.

use reqwest::StatusCode;
use serde_json::{json, Value};

mod common;
use common::{client, expired_token, gateway_config, route, spawn_gateway, token, EchoUpstream};

#[tokio::test]
async fn public_route_forwards_with_rewritten_path() {
    let upstream = EchoUpstream::start().await;
    let gateway = spawn_gateway(gateway_config(vec![route(
        "auth",
        "/api/auth",
        upstream.url(),
        "/auth",
        false,
    )]))
    .await;

    let res = client()
        .post(gateway.url("/api/auth/register?source=web"))
        .header("content-type", "application/json")
        .body(r#"{"email":"a@b.c"}"#)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));
    let echoed: Value = res.json().await.unwrap();
    assert_eq!(echoed["method"], "POST");
    assert_eq!(echoed["path"], "/auth/register");
    assert_eq!(echoed["query"], "source=web");
    assert_eq!(echoed["body"], r#"{"email":"a@b.c"}"#);
    assert_eq!(echoed["host"], upstream.addr.to_string());
    assert_eq!(echoed["x_forwarded_for"], "127.0.0.1");
    assert!(echoed["x_request_id"].is_string());
    assert!(echoed["authorization"].is_null());
}

#[tokio::test]
async fn protected_route_requires_credentials() {
    let upstream = EchoUpstream::start().await;
    let gateway = spawn_gateway(gateway_config(vec![route(
        "orders",
        "/api/orders",
        upstream.url(),
        "/orders",
        true,
    )]))
    .await;

    let res = client().get(gateway.url("/api/orders/123")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "message": "Authentication required" }));
    assert_eq!(upstream.hits(), 0);

    let res = client()
        .get(gateway.url("/api/orders/123"))
        .bearer_auth(token())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let echoed: Value = res.json().await.unwrap();
    assert_eq!(echoed["path"], "/orders/123");
    assert_eq!(echoed["authorization"], format!("Bearer {}", token()));
    assert_eq!(upstream.hits(), 1);
}

#[tokio::test]
async fn bad_tokens_are_rejected_on_any_route() {
    let upstream = EchoUpstream::start().await;
    let gateway = spawn_gateway(gateway_config(vec![route(
        "auth",
        "/api/auth",
        upstream.url(),
        "/auth",
        false,
    )]))
    .await;

    for bad in ["not-a-jwt".to_string(), expired_token()] {
        for path in ["/api/auth/login", "/somewhere/else"] {
            let res = client().get(gateway.url(path)).bearer_auth(&bad).send().await.unwrap();
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{}", path);
            let body: Value = res.json().await.unwrap();
            assert_eq!(body, json!({ "message": "Invalid or expired token" }));
        }
    }

    assert_eq!(upstream.hits(), 0);
}

#[tokio::test]
async fn unmatched_paths_are_404() {
    let upstream = EchoUpstream::start().await;
    let gateway = spawn_gateway(gateway_config(vec![route(
        "auth",
        "/api/auth",
        upstream.url(),
        "/auth",
        false,
    )]))
    .await;

    for path in ["/", "/api", "/api/authx/login", "/health"] {
        let res = client().get(gateway.url(path)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{}", path);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body, json!({ "error": "Not found" }));
    }
    assert_eq!(upstream.hits(), 0);
}

#[tokio::test]
async fn longest_prefix_wins() {
    let general = EchoUpstream::start().await;
    let specific = EchoUpstream::start().await;
    let gateway = spawn_gateway(gateway_config(vec![
        route("api", "/api", general.url(), "/", false),
        route("auth", "/api/auth", specific.url(), "/auth", false),
    ]))
    .await;

    let echoed: Value = client()
        .get(gateway.url("/api/auth"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(echoed["path"], "/auth");
    assert_eq!(specific.hits(), 1);

    let echoed: Value = client()
        .get(gateway.url("/api/menus/7"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(echoed["path"], "/menus/7");
    assert_eq!(general.hits(), 1);
}

#[tokio::test]
async fn repeated_gets_are_not_cached() {
    let upstream = EchoUpstream::start().await;
    let gateway = spawn_gateway(gateway_config(vec![route(
        "restaurants",
        "/api/restaurants",
        upstream.url(),
        "/restaurants",
        true,
    )]))
    .await;

    let mut bodies = Vec::new();
    for _ in 0..3 {
        let res = client()
            .get(gateway.url("/api/restaurants"))
            .bearer_auth(token())
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let mut body: Value = res.json().await.unwrap();
        body["x_request_id"] = Value::Null;
        bodies.push(body);
    }

    assert_eq!(upstream.hits(), 3);
    assert!(bodies.windows(2).all(|pair| pair[0] == pair[1]));
}

#[tokio::test]
async fn oversized_body_is_413() {
    let upstream = EchoUpstream::start().await;
    let mut config = gateway_config(vec![route("auth", "/api/auth", upstream.url(), "/auth", false)]);
    config.security.max_body_size = 16;
    let gateway = spawn_gateway(config).await;

    let res = client()
        .post(gateway.url("/api/auth/register"))
        .body(vec![b'x'; 1024])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn oversized_chunked_body_is_413_not_proxy_error() {
    let upstream = EchoUpstream::start().await;
    let mut config = gateway_config(vec![route("auth", "/api/auth", upstream.url(), "/auth", false)]);
    config.security.max_body_size = 16;
    let gateway = spawn_gateway(config).await;

    // A streamed body carries no Content-Length, so only the running count can stop it.
    let chunks: Vec<Result<Vec<u8>, std::io::Error>> = vec![Ok(vec![b'x'; 512]), Ok(vec![b'x'; 512])];
    let res = client()
        .post(gateway.url("/api/auth/register"))
        .body(reqwest::Body::wrap_stream(futures_util::stream::iter(chunks)))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Payload too large" }));
    assert_eq!(upstream.hits(), 0);
}
