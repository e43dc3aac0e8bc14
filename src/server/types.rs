//! REST API request/response types
//!
//! The frontend sends numeric form values as strings, so numeric
//! request fields accept both JSON numbers and string representations.

use crate::baas::OrderSide;
use crate::market::MarketType;
use crate::services::order_service::OrderKind;
use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// Flexible deserializers
// ============================================================================

/// Deserialize a value that can be either a number or a string
/// representation of a number.
pub fn deserialize_flexible_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FlexibleInt {
        Int(i64),
        Float(f64),
        Str(String),
    }

    match FlexibleInt::deserialize(deserializer)? {
        FlexibleInt::Int(i) => Ok(i),
        FlexibleInt::Float(f) => Ok(f as i64),
        FlexibleInt::Str(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

pub fn deserialize_optional_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FlexibleOptFloat {
        None,
        Float(f64),
        Int(i64),
        Str(String),
    }

    match Option::<FlexibleOptFloat>::deserialize(deserializer)? {
        None => Ok(None),
        Some(FlexibleOptFloat::None) => Ok(None),
        Some(FlexibleOptFloat::Float(f)) => Ok(Some(f)),
        Some(FlexibleOptFloat::Int(i)) => Ok(Some(i as f64)),
        Some(FlexibleOptFloat::Str(s)) if s.trim().is_empty() => Ok(None),
        Some(FlexibleOptFloat::Str(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

// ============================================================================
// Response envelope
// ============================================================================

/// Standard API response format
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Empty data payload
#[derive(Debug, Clone, Serialize)]
pub struct Empty {}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: None,
            data: Some(data),
        }
    }

    pub fn success_with_message(message: &str) -> Self {
        Self {
            status: "success".to_string(),
            message: Some(message.to_string()),
            data: None,
        }
    }
}

// ============================================================================
// Request payloads
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub initial_funds: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username or email
    pub identity: String,
    pub password: String,
}

fn default_order_kind() -> OrderKind {
    OrderKind::Limit
}

fn default_market() -> MarketType {
    MarketType::AShare
}

#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub stock_code: String,
    pub side: OrderSide,
    #[serde(default = "default_order_kind")]
    pub order_type: OrderKind,
    #[serde(default, deserialize_with = "deserialize_optional_f64")]
    pub price: Option<f64>,
    #[serde(deserialize_with = "deserialize_flexible_i64")]
    pub quantity: i64,
    #[serde(default = "default_market")]
    pub market: MarketType,
}

#[derive(Debug, Deserialize)]
pub struct CreatePositionRequest {
    pub stock_code: String,
    #[serde(deserialize_with = "deserialize_flexible_i64")]
    pub quantity: i64,
    #[serde(deserialize_with = "deserialize_flexible_f64_required")]
    pub avg_price: f64,
}

fn deserialize_flexible_f64_required<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_optional_f64(deserializer)?
        .ok_or_else(|| serde::de::Error::custom("expected a number"))
}

#[derive(Debug, Deserialize)]
pub struct UpdateBalanceRequest {
    #[serde(deserialize_with = "deserialize_flexible_f64_required")]
    pub balance: f64,
}

#[derive(Debug, Deserialize)]
pub struct AssistantRequest {
    pub query: String,
    #[serde(default)]
    pub stock_code: Option<String>,
    #[serde(default = "default_market")]
    pub market: MarketType,
}

/// Query string for quote endpoints
#[derive(Debug, Deserialize)]
pub struct QuoteQuery {
    #[serde(default = "default_market")]
    pub market: MarketType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_order_accepts_string_numbers() {
        let json = serde_json::json!({
            "stock_code": "000001",
            "side": "buy",
            "order_type": "limit",
            "price": "11.57",
            "quantity": "100"
        });
        let req: PlaceOrderRequest = serde_json::from_value(json).unwrap();
        assert_eq!(req.price, Some(11.57));
        assert_eq!(req.quantity, 100);
        assert_eq!(req.market, MarketType::AShare);
    }

    #[test]
    fn test_place_order_defaults() {
        let json = serde_json::json!({
            "stock_code": "000001",
            "side": "sell",
            "quantity": 200
        });
        let req: PlaceOrderRequest = serde_json::from_value(json).unwrap();
        assert_eq!(req.order_type, OrderKind::Limit);
        assert!(req.price.is_none());
    }

    #[test]
    fn test_register_empty_funds_string_is_none() {
        let json = serde_json::json!({
            "username": "testuser",
            "password": "secret1",
            "password_confirm": "secret1",
            "initial_funds": ""
        });
        let req: RegisterRequest = serde_json::from_value(json).unwrap();
        assert!(req.initial_funds.is_none());
    }

    #[test]
    fn test_update_balance_accepts_string_amount() {
        let req: UpdateBalanceRequest =
            serde_json::from_value(serde_json::json!({ "balance": "95000.50" })).unwrap();
        assert_eq!(req.balance, 95000.50);
    }

    #[test]
    fn test_api_response_skips_empty_fields() {
        let resp = ApiResponse::<Empty>::success_with_message("ok");
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["status"], "success");
        assert!(json.get("data").is_none());
    }
}
