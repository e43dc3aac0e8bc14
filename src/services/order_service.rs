//! Order Service
//!
//! Handles simulated order placement, listing and cancellation. Orders
//! are persisted verbatim to the BaaS with status `pending`; there is
//! no matching and no execution. Cancel is the only transition.

use crate::baas::{OrderRecord, OrderSide, OrderStatus};
use crate::error::{AppError, Result};
use crate::market::MarketType;
use crate::state::{AppState, UserSession};
use serde::{Deserialize, Serialize};
use tracing::info;

/// How the order price is determined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderKind {
    /// Price supplied by the caller
    Limit,
    /// Price taken from the current quote
    Market,
}

/// Result of placing an order
#[derive(Debug, Clone, Serialize)]
pub struct PlaceOrderResult {
    pub success: bool,
    pub order: OrderRecord,
    pub message: String,
}

/// Order service for business logic
pub struct OrderService;

impl OrderService {
    /// Place a simulated order.
    ///
    /// Market orders take the current quote price (which may be
    /// synthetic when the quota is spent); limit orders must carry a
    /// positive price of their own.
    pub async fn place_order(
        state: &AppState,
        session: &UserSession,
        stock_code: &str,
        side: OrderSide,
        kind: OrderKind,
        price: Option<f64>,
        quantity: i64,
        market: MarketType,
    ) -> Result<PlaceOrderResult> {
        info!(
            "OrderService::place_order - {} {} {} x{}",
            session.username, side, stock_code, quantity
        );

        if stock_code.trim().is_empty() {
            return Err(AppError::Validation("Stock code is required".to_string()));
        }

        if quantity <= 0 {
            return Err(AppError::Validation(
                "Quantity must be positive".to_string(),
            ));
        }

        let order_price = match kind {
            OrderKind::Limit => match price {
                Some(p) if p > 0.0 => p,
                _ => {
                    return Err(AppError::Validation(
                        "Price must be positive for limit orders".to_string(),
                    ))
                }
            },
            OrderKind::Market => {
                let envelope = state.market.get_quote(stock_code, market).await;
                envelope.quote.price
            }
        };

        let order = state
            .baas
            .create_order(
                &session.token,
                &session.user_id,
                stock_code.trim(),
                side,
                order_price,
                quantity,
            )
            .await?;

        Ok(PlaceOrderResult {
            success: true,
            order,
            message: format!("{} order submitted", side),
        })
    }

    /// List the session's orders, newest first (BaaS sorts on `-created`)
    pub async fn list_orders(
        state: &AppState,
        session: &UserSession,
    ) -> Result<Vec<OrderRecord>> {
        state
            .baas
            .list_orders(&session.token, &session.user_id)
            .await
    }

    /// Cancel one of the session's pending orders
    pub async fn cancel_order(
        state: &AppState,
        session: &UserSession,
        order_id: &str,
    ) -> Result<OrderRecord> {
        info!("OrderService::cancel_order - {}", order_id);

        let order = state.baas.get_order(&session.token, order_id).await?;
        ensure_cancellable(&order, &session.user_id)?;

        state
            .baas
            .update_order_status(&session.token, order_id, OrderStatus::Cancelled)
            .await
    }
}

/// Cancel guard: the caller must own the order and it must still be
/// pending. The ownership failure reads as not-found so other users'
/// order ids are not confirmed to exist.
fn ensure_cancellable(order: &OrderRecord, user_id: &str) -> Result<()> {
    if order.user_id != user_id {
        return Err(AppError::NotFound(format!("Order {} not found", order.id)));
    }

    if order.status != OrderStatus::Pending {
        return Err(AppError::Validation(format!(
            "Only pending orders can be cancelled (order is {})",
            order.status
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn test_state() -> AppState {
        AppState::new(Config {
            host: "127.0.0.1".into(),
            port: 0,
            baas_url: "http://127.0.0.1:1".into(),
            quote_api_url: "http://127.0.0.1:1".into(),
            quote_api_token: "".into(),
            daily_request_limit: 10,
            feed_interval_secs: 3,
        })
    }

    fn test_session() -> UserSession {
        UserSession {
            token: "tok".into(),
            user_id: "usr1".into(),
            username: "testuser".into(),
            authenticated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_order_kind_parses_lowercase() {
        let kind: OrderKind = serde_json::from_str("\"limit\"").unwrap();
        assert_eq!(kind, OrderKind::Limit);
        let kind: OrderKind = serde_json::from_str("\"market\"").unwrap();
        assert_eq!(kind, OrderKind::Market);
    }

    #[tokio::test]
    async fn test_non_positive_quantity_rejected() {
        let state = test_state();
        let session = test_session();

        for qty in [0, -100] {
            let err = OrderService::place_order(
                &state,
                &session,
                "000001",
                OrderSide::Buy,
                OrderKind::Limit,
                Some(11.57),
                qty,
                MarketType::AShare,
            )
            .await
            .unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn test_limit_order_requires_positive_price() {
        let state = test_state();
        let session = test_session();

        for price in [None, Some(0.0), Some(-1.0)] {
            let err = OrderService::place_order(
                &state,
                &session,
                "000001",
                OrderSide::Sell,
                OrderKind::Limit,
                price,
                100,
                MarketType::AShare,
            )
            .await
            .unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
    }

    fn test_order(owner: &str, status: OrderStatus) -> OrderRecord {
        OrderRecord {
            id: "ord1".into(),
            user_id: owner.into(),
            stock_code: "000001".into(),
            side: OrderSide::Buy,
            price: 11.57,
            quantity: 100,
            status,
            created: String::new(),
        }
    }

    #[test]
    fn test_cancel_requires_ownership() {
        let order = test_order("usr2", OrderStatus::Pending);
        // Someone else's order looks like it does not exist
        let err = ensure_cancellable(&order, "usr1").unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_cancel_only_from_pending() {
        for status in [OrderStatus::Completed, OrderStatus::Cancelled] {
            let order = test_order("usr1", status);
            let err = ensure_cancellable(&order, "usr1").unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }

        let order = test_order("usr1", OrderStatus::Pending);
        assert!(ensure_cancellable(&order, "usr1").is_ok());
    }

    #[tokio::test]
    async fn test_empty_stock_code_rejected() {
        let state = test_state();
        let session = test_session();

        let err = OrderService::place_order(
            &state,
            &session,
            "  ",
            OrderSide::Buy,
            OrderKind::Limit,
            Some(10.0),
            100,
            MarketType::AShare,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
