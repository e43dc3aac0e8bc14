//! Record shapes for the BaaS collections
//!
//! Mirrors the `users`, `orders` and `portfolio` collections. The BaaS
//! manages `id`/`created`/`updated`; everything else is written verbatim.

use serde::{Deserialize, Serialize};

/// Order side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "buy"),
            OrderSide::Sell => write!(f, "sell"),
        }
    }
}

/// Order status. Orders are created `pending`; the only transition this
/// system performs is an explicit cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Completed => write!(f, "completed"),
            OrderStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Account record from the `users` auth collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRecord {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
    /// Simulated funds, in account currency
    #[serde(default)]
    pub balance: f64,
    #[serde(default)]
    pub created: String,
}

/// Order record from the `orders` collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: String,
    pub user_id: String,
    pub stock_code: String,
    pub side: OrderSide,
    pub price: f64,
    pub quantity: i64,
    pub status: OrderStatus,
    #[serde(default)]
    pub created: String,
}

/// Portfolio entry from the `portfolio` collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioRecord {
    pub id: String,
    pub user_id: String,
    pub stock_code: String,
    pub quantity: i64,
    pub avg_price: f64,
    #[serde(default)]
    pub created: String,
}
