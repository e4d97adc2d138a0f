use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// Failure talking to the gateway.
#[derive(Debug, Error)]
pub enum SdkError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("gateway returned {status}: {body}")]
    Status { status: StatusCode, body: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub price: f64,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

pub struct GatewayClient {
    client: Client,
    gateway_url: String,
    token: Option<String>,
}

impl GatewayClient {
    pub fn new(gateway_url: &str) -> Self {
        Self {
            client: Client::new(),
            gateway_url: gateway_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Use `token` as the bearer credential for subsequent calls.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<Value, SdkError> {
        let body = json!({ "name": name, "email": email, "password": password });
        self.post_json("/api/auth/register", &body).await
    }

    /// Log in and keep the returned token on this client.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<String, SdkError> {
        let resp = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let login: LoginResponse = Self::success(resp).await?.json().await?;
        self.token = Some(login.token.clone());
        Ok(login.token)
    }

    pub async fn restaurants(&self) -> Result<Value, SdkError> {
        self.get_json("/api/restaurants").await
    }

    pub async fn create_restaurant(&self, name: &str, address: &str) -> Result<Value, SdkError> {
        self.post_json("/api/restaurants", &json!({ "name": name, "address": address }))
            .await
    }

    pub async fn create_order(
        &self,
        user_id: &str,
        restaurant_id: &str,
        items: &[NewOrderItem],
    ) -> Result<Value, SdkError> {
        let body = json!({ "userId": user_id, "restaurantId": restaurant_id, "items": items });
        self.post_json("/api/orders", &body).await
    }

    pub async fn order(&self, order_id: &str) -> Result<Value, SdkError> {
        self.get_json(&format!("/api/orders/{}", order_id)).await
    }

    pub async fn order_history(&self, user_id: &str) -> Result<Value, SdkError> {
        self.get_json(&format!("/api/orders/user/{}", user_id)).await
    }

    /// Perform a raw GET through the gateway with the stored token, if any.
    pub async fn get(&self, path: &str) -> Result<Response, reqwest::Error> {
        let mut req = self.client.get(self.url(path));
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        req.send().await
    }

    async fn get_json(&self, path: &str) -> Result<Value, SdkError> {
        let resp = self.get(path).await?;
        Ok(Self::success(resp).await?.json().await?)
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, SdkError> {
        let mut req = self.client.post(self.url(path)).json(body);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await?;
        Ok(Self::success(resp).await?.json().await?)
    }

    async fn success(resp: Response) -> Result<Response, SdkError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(SdkError::Status { status, body })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.gateway_url, path)
    }
}
