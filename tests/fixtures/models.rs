use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A customer order
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: u64,
    pub customer: Customer,
    pub lines: Vec<OrderLine>,
    #[schema(format = "date-time")]
    pub placed_at: String,
    pub status: OrderStatus,
    pub notes: Option<String>,
    #[serde(skip)]
    pub cache_key: String,
    pub attributes: HashMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    /// Contact address
    #[schema(format = "email")]
    pub email: String,
    pub referrer: Option<Box<Customer>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderLine {
    pub sku: String,
    #[schema(minimum = 1)]
    pub quantity: u32,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Placed,
    InTransit,
    Delivered,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<String>,
}
