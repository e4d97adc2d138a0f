//! Restaurant service: restaurants and their menus.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::services::error::ServiceError;
use crate::services::store::{new_id, Collection};

const NOT_FOUND: ServiceError = ServiceError::NotFound("Restaurant not found");

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct NewRestaurant {
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub cuisine: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Partial update; absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct RestaurantPatch {
    pub name: Option<String>,
    pub address: Option<String>,
    pub cuisine: Option<String>,
    pub image: Option<String>,
}

impl RestaurantPatch {
    fn apply(self, restaurant: &mut Restaurant) {
        if let Some(name) = self.name {
            restaurant.name = name;
        }
        if let Some(address) = self.address {
            restaurant.address = address;
        }
        if self.cuisine.is_some() {
            restaurant.cuisine = self.cuisine;
        }
        if self.image.is_some() {
            restaurant.image = self.image;
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    #[serde(rename = "_id")]
    pub id: String,
    pub restaurant_id: String,
    pub name: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct NewMenuItem {
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Clone, Default)]
pub struct RestaurantState {
    restaurants: Arc<Collection<Restaurant>>,
    menu: Arc<Collection<MenuItem>>,
}

impl RestaurantState {
    pub fn new() -> Self {
        Self::default()
    }
}

pub fn router(state: RestaurantState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/restaurants", get(list_restaurants).post(create_restaurant))
        .route(
            "/restaurants/{id}",
            get(get_restaurant).put(update_restaurant).delete(delete_restaurant),
        )
        .route("/restaurants/{id}/menu", get(list_menu).post(add_menu_item))
        .with_state(state)
}

async fn index() -> &'static str {
    "Restaurant Service Running"
}

async fn create_restaurant(
    State(state): State<RestaurantState>,
    Json(req): Json<NewRestaurant>,
) -> Json<Value> {
    let restaurant = Restaurant {
        id: new_id(),
        name: req.name,
        address: req.address,
        cuisine: req.cuisine,
        image: req.image,
        created_at: Utc::now(),
    };
    state.restaurants.insert(restaurant.id.clone(), restaurant.clone());

    tracing::info!(restaurant_id = %restaurant.id, "Restaurant created");
    Json(json!({ "message": "Restaurant created", "restaurant": restaurant }))
}

async fn list_restaurants(State(state): State<RestaurantState>) -> Json<Vec<Restaurant>> {
    Json(state.restaurants.all())
}

async fn get_restaurant(
    State(state): State<RestaurantState>,
    Path(id): Path<String>,
) -> Result<Json<Restaurant>, ServiceError> {
    state.restaurants.get(&id).map(Json).ok_or(NOT_FOUND)
}

async fn update_restaurant(
    State(state): State<RestaurantState>,
    Path(id): Path<String>,
    Json(patch): Json<RestaurantPatch>,
) -> Result<Json<Value>, ServiceError> {
    let restaurant = state
        .restaurants
        .update(&id, |r| patch.apply(r))
        .ok_or(NOT_FOUND)?;

    tracing::info!(restaurant_id = %id, "Restaurant updated");
    Ok(Json(json!({ "message": "Restaurant updated", "restaurant": restaurant })))
}

async fn delete_restaurant(
    State(state): State<RestaurantState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ServiceError> {
    state.restaurants.remove(&id).ok_or(NOT_FOUND)?;

    tracing::info!(restaurant_id = %id, "Restaurant deleted");
    Ok(Json(json!({ "message": "Restaurant deleted" })))
}

async fn add_menu_item(
    State(state): State<RestaurantState>,
    Path(id): Path<String>,
    Json(req): Json<NewMenuItem>,
) -> Result<Json<Value>, ServiceError> {
    if !state.restaurants.contains(&id) {
        return Err(NOT_FOUND);
    }

    let item = MenuItem {
        id: new_id(),
        restaurant_id: id,
        name: req.name,
        price: req.price,
        category: req.category,
        image: req.image,
        created_at: Utc::now(),
    };
    state.menu.insert(item.id.clone(), item.clone());

    tracing::info!(restaurant_id = %item.restaurant_id, item_id = %item.id, "Menu item added");
    Ok(Json(json!({ "message": "Menu item added", "menuItem": item })))
}

async fn list_menu(State(state): State<RestaurantState>, Path(id): Path<String>) -> Json<Vec<MenuItem>> {
    Json(state.menu.find(|item| item.restaurant_id == id))
}
