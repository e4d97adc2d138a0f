//! The gateway in front of the real services, driven through the SDK.

use std::collections::HashMap;

use food_gateway::config;
use food_gateway::security::TokenKeys;
use food_gateway::services::{orders, restaurants, users};
use food_gateway_sdk::{GatewayClient, NewOrderItem, SdkError};
use reqwest::StatusCode;
use serde_json::json;

mod common;
use common::{spawn_gateway, spawn_router, TestGateway, SECRET};

async fn stack() -> (TestGateway, GatewayClient) {
    let user_addr = spawn_router(users::router(users::UserState::new(SECRET, 4))).await;
    let restaurant_addr = spawn_router(restaurants::router(restaurants::RestaurantState::new())).await;
    let order_addr = spawn_router(orders::router(orders::OrderState::new())).await;

    let vars: HashMap<&str, String> = HashMap::from([
        ("JWT_SECRET", SECRET.to_string()),
        ("RATE_LIMIT_ENABLED", "false".to_string()),
        ("USER_SERVICE_URL", format!("http://{}", user_addr)),
        ("RESTAURANT_SERVICE_URL", format!("http://{}", restaurant_addr)),
        ("ORDER_SERVICE_URL", format!("http://{}", order_addr)),
    ]);
    let config = config::from_lookup(|key| vars.get(key).cloned()).unwrap();
    assert_eq!(config.routes.len(), 3);

    let gateway = spawn_gateway(config).await;
    let client = GatewayClient::new(&gateway.url(""));
    (gateway, client)
}

#[tokio::test]
async fn register_twice_through_gateway() {
    let (_gateway, client) = stack().await;

    let body = client.register("Alice", "alice@example.com", "hunter22").await.unwrap();
    assert_eq!(body, json!({ "message": "User registered" }));

    match client.register("Alice", "alice@example.com", "hunter22").await {
        Err(SdkError::Status { status, body }) => {
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(serde_json::from_str::<serde_json::Value>(&body).unwrap(), json!({ "message": "Email already exists" }));
        }
        other => panic!("expected 400, got {:?}", other),
    }
}

#[tokio::test]
async fn protected_services_need_a_token() {
    let (_gateway, client) = stack().await;

    match client.restaurants().await {
        Err(SdkError::Status { status, .. }) => assert_eq!(status, StatusCode::UNAUTHORIZED),
        other => panic!("expected 401, got {:?}", other),
    }
}

#[tokio::test]
async fn order_flow_computes_total() {
    let (gateway, mut client) = stack().await;
    client.register("Bob", "bob@example.com", "pa55word").await.unwrap();
    let token = client.login("bob@example.com", "pa55word").await.unwrap();
    assert_eq!(client.token(), Some(token.as_str()));
    let user_id = TokenKeys::new(SECRET).verify(&token).unwrap().subject_id;

    let created = client.create_restaurant("Noodle Bar", "9 Side St").await.unwrap();
    let restaurant_id = created["restaurant"]["_id"].as_str().unwrap().to_string();
    assert_eq!(client.restaurants().await.unwrap().as_array().unwrap().len(), 1);

    let other_device = GatewayClient::new(&gateway.url("")).with_token(token.clone());
    assert_eq!(other_device.restaurants().await.unwrap().as_array().unwrap().len(), 1);

    let items = [
        NewOrderItem { name: Some("Ramen".into()), price: 10.0, quantity: 2 },
        NewOrderItem { name: None, price: 5.0, quantity: 3 },
    ];
    let created = client.create_order(&user_id, &restaurant_id, &items).await.unwrap();
    assert_eq!(created["message"], "Order created");
    assert_eq!(created["order"]["totalPrice"], 35.0);
    let order_id = created["order"]["_id"].as_str().unwrap().to_string();

    let order = client.order(&order_id).await.unwrap();
    assert_eq!(order["status"], "pending");
    assert_eq!(order["restaurantId"], restaurant_id.as_str());

    let history = client.order_history(&user_id).await.unwrap();
    assert_eq!(history.as_array().unwrap().len(), 1);
}
