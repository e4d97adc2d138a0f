//! Order service: order creation, lookup, history and status.
//!
//! The total is always computed here from the submitted items; any total the
//! client sends is ignored.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::services::error::ServiceError;
use crate::services::store::{new_id, Collection};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Preparing,
    OnTheWay,
    Delivered,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub price: f64,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub restaurant_id: String,
    pub items: Vec<OrderItem>,
    pub total_price: f64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub user_id: String,
    pub restaurant_id: String,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

/// Sum of `price × quantity` over all items.
pub fn total_price(items: &[OrderItem]) -> f64 {
    items.iter().map(|item| item.price * f64::from(item.quantity)).sum()
}

#[derive(Clone, Default)]
pub struct OrderState {
    orders: Arc<Collection<Order>>,
}

impl OrderState {
    pub fn new() -> Self {
        Self::default()
    }
}

pub fn router(state: OrderState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/orders", post(create_order))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/status", put(update_status))
        .route("/orders/user/{user_id}", get(orders_for_user))
        .route("/users/{user_id}/orders", get(orders_for_user))
        .with_state(state)
}

async fn index() -> &'static str {
    "Order Service Running"
}

async fn create_order(State(state): State<OrderState>, Json(req): Json<NewOrder>) -> Json<Value> {
    let order = Order {
        id: new_id(),
        total_price: total_price(&req.items),
        user_id: req.user_id,
        restaurant_id: req.restaurant_id,
        items: req.items,
        status: OrderStatus::Pending,
        created_at: Utc::now(),
    };
    state.orders.insert(order.id.clone(), order.clone());

    tracing::info!(
        order_id = %order.id,
        user_id = %order.user_id,
        total_price = order.total_price,
        "Order created"
    );
    Json(json!({ "message": "Order created", "order": order }))
}

async fn get_order(State(state): State<OrderState>, Path(id): Path<String>) -> Result<Json<Order>, ServiceError> {
    state
        .orders
        .get(&id)
        .map(Json)
        .ok_or(ServiceError::NotFound("Order not found"))
}

async fn orders_for_user(State(state): State<OrderState>, Path(user_id): Path<String>) -> Json<Vec<Order>> {
    Json(state.orders.find(|order| order.user_id == user_id))
}

async fn update_status(
    State(state): State<OrderState>,
    Path(id): Path<String>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<Value>, ServiceError> {
    let order = state
        .orders
        .update(&id, |order| order.status = update.status)
        .ok_or(ServiceError::NotFound("Order not found"))?;

    tracing::info!(order_id = %id, status = ?order.status, "Order status updated");
    Ok(Json(json!({ "message": "Status updated", "order": order })))
}
