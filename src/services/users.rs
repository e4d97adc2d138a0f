//! User service: registration and login.
//!
//! Passwords are stored as bcrypt hashes; hashing runs on the blocking pool.
//! Users are keyed by email so the duplicate check and the insert are one
//! atomic step.

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::security::token::{TokenKeys, TOKEN_TTL_HOURS};
use crate::services::error::ServiceError;
use crate::services::store::{new_id, Collection};

#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Clone)]
pub struct UserState {
    users: Arc<Collection<User>>,
    keys: Arc<TokenKeys>,
    bcrypt_cost: u32,
}

impl UserState {
    pub fn new(jwt_secret: &str, bcrypt_cost: u32) -> Self {
        Self {
            users: Arc::new(Collection::new()),
            keys: Arc::new(TokenKeys::new(jwt_secret)),
            bcrypt_cost,
        }
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}

pub fn router(state: UserState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .with_state(state)
}

async fn index() -> &'static str {
    "User Service Running"
}

async fn register(
    State(state): State<UserState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<Value>, ServiceError> {
    if state.users.contains(&req.email) {
        return Err(ServiceError::BadRequest("Email already exists"));
    }

    let cost = state.bcrypt_cost;
    let password = req.password;
    let password_hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;

    let user = User {
        id: new_id(),
        name: req.name,
        email: req.email.clone(),
        password_hash,
        created_at: Utc::now(),
    };
    let user_id = user.id.clone();

    // A concurrent registration may have won while we were hashing.
    if state.users.insert_new(req.email, user).is_err() {
        return Err(ServiceError::BadRequest("Email already exists"));
    }

    tracing::info!(user_id = %user_id, "User registered");
    Ok(Json(json!({ "message": "User registered" })))
}

async fn login(
    State(state): State<UserState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<Value>, ServiceError> {
    let user = state
        .users
        .get(&req.email)
        .ok_or(ServiceError::NotFound("User not found"))?;

    let password = req.password;
    let hash = user.password_hash.clone();
    let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??;
    if !matches {
        tracing::debug!(user_id = %user.id, "Wrong password");
        return Err(ServiceError::BadRequest("Wrong password"));
    }

    let token = state
        .keys
        .issue(&user.id, &user.email, Duration::hours(TOKEN_TTL_HOURS))?;

    tracing::info!(user_id = %user.id, "Login succeeded");
    Ok(Json(json!({ "token": token })))
}
