//! Portfolio Service
//!
//! Lists and creates portfolio entries. Entries are ad hoc records in
//! the BaaS; nothing reconciles them against orders.

use crate::baas::PortfolioRecord;
use crate::error::{AppError, Result};
use crate::state::{AppState, UserSession};
use serde::Serialize;
use tracing::info;

/// Result of listing a portfolio
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioResult {
    pub success: bool,
    pub positions: Vec<PortfolioRecord>,
}

/// Portfolio service for business logic
pub struct PortfolioService;

impl PortfolioService {
    /// List the session's portfolio entries, newest first
    pub async fn get_portfolio(
        state: &AppState,
        session: &UserSession,
    ) -> Result<PortfolioResult> {
        info!("PortfolioService::get_portfolio - {}", session.username);

        let positions = state
            .baas
            .list_portfolio(&session.token, &session.user_id)
            .await?;

        Ok(PortfolioResult {
            success: true,
            positions,
        })
    }

    /// Create an ad-hoc portfolio entry
    pub async fn create_position(
        state: &AppState,
        session: &UserSession,
        stock_code: &str,
        quantity: i64,
        avg_price: f64,
    ) -> Result<PortfolioRecord> {
        if stock_code.trim().is_empty() {
            return Err(AppError::Validation("Stock code is required".to_string()));
        }
        if quantity <= 0 {
            return Err(AppError::Validation(
                "Quantity must be positive".to_string(),
            ));
        }
        if avg_price <= 0.0 {
            return Err(AppError::Validation(
                "Average price must be positive".to_string(),
            ));
        }

        state
            .baas
            .create_position(
                &session.token,
                &session.user_id,
                stock_code.trim(),
                quantity,
                avg_price,
            )
            .await
    }
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

    #[tokio::test]
    async fn test_create_position_validates_inputs() {
        let state = test_state();
        let session = UserSession {
            token: "tok".into(),
            user_id: "usr1".into(),
            username: "testuser".into(),
            authenticated_at: chrono::Utc::now(),
        };

        let err = PortfolioService::create_position(&state, &session, "000001", 0, 10.0)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = PortfolioService::create_position(&state, &session, "000001", 100, 0.0)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = PortfolioService::create_position(&state, &session, "", 100, 10.0)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
