//! Client for the food delivery gateway API.

pub mod client;

pub use client::{GatewayClient, NewOrderItem, SdkError};
