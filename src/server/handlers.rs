//! REST API endpoint handlers
//!
//! Thin over the services layer: extract the session, hand off, wrap
//! the result in the response envelope.

use crate::baas::{AccountRecord, OrderRecord, PortfolioRecord};
use crate::error::{AppError, Result};
use crate::market::quota::QuotaStatus;
use crate::market::{MarketType, QuoteEnvelope};
use crate::server::types::*;
use crate::services::{
    AssistantReply, AssistantService, AuthService, LoginResult, OrderService, PlaceOrderResult,
    PortfolioService, PortfolioResult, RegisterResult,
};
use crate::state::{AppState, UserSession};
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use std::sync::Arc;

/// Pull the session token out of the Authorization header. A `Bearer `
/// prefix is accepted but not required.
fn bearer_token(headers: &HeaderMap) -> Result<String> {
    let value = headers
        .get("Authorization")
        .ok_or_else(|| AppError::Auth("Missing Authorization header".to_string()))?
        .to_str()
        .map_err(|_| AppError::Auth("Invalid Authorization header".to_string()))?;

    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    if token.is_empty() {
        return Err(AppError::Auth("Missing session token".to_string()));
    }
    Ok(token.to_string())
}

/// Resolve the calling session or fail with 401
fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<UserSession> {
    let token = bearer_token(headers)?;
    state.require_session(&token)
}

// ============================================================================
// Health check
// ============================================================================

/// Health check endpoint - GET /health or GET /
pub async fn health_check() -> Json<ApiResponse<Empty>> {
    Json(ApiResponse::success_with_message(
        "Paper trading server is running",
    ))
}

// ============================================================================
// Auth
// ============================================================================

/// POST /api/v1/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<RegisterResult>>> {
    let result = AuthService::register(
        &state,
        &payload.username,
        &payload.email,
        &payload.password,
        &payload.password_confirm,
        payload.initial_funds,
    )
    .await?;

    Ok(Json(ApiResponse::success(result)))
}

/// POST /api/v1/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResult>>> {
    let result = AuthService::login(&state, &payload.identity, &payload.password).await?;
    Ok(Json(ApiResponse::success(result)))
}

/// POST /api/v1/logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<Empty>>> {
    let token = bearer_token(&headers)?;
    AuthService::logout(&state, &token);
    Ok(Json(ApiResponse::success_with_message("Logged out")))
}

/// GET /api/v1/account
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<AccountRecord>>> {
    let session = authenticate(&state, &headers)?;
    let account = AuthService::get_account(&state, &session).await?;
    Ok(Json(ApiResponse::success(account)))
}

/// PATCH /api/v1/account
pub async fn update_balance(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<UpdateBalanceRequest>,
) -> Result<Json<ApiResponse<AccountRecord>>> {
    let session = authenticate(&state, &headers)?;
    let account = AuthService::update_balance(&state, &session, payload.balance).await?;
    Ok(Json(ApiResponse::success(account)))
}

// ============================================================================
// Orders
// ============================================================================

/// POST /api/v1/orders
pub async fn place_order(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<PlaceOrderRequest>,
) -> Result<Json<ApiResponse<PlaceOrderResult>>> {
    let session = authenticate(&state, &headers)?;

    let result = OrderService::place_order(
        &state,
        &session,
        &payload.stock_code,
        payload.side,
        payload.order_type,
        payload.price,
        payload.quantity,
        payload.market,
    )
    .await?;

    Ok(Json(ApiResponse::success(result)))
}

/// GET /api/v1/orders
pub async fn list_orders(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<Vec<OrderRecord>>>> {
    let session = authenticate(&state, &headers)?;
    let orders = OrderService::list_orders(&state, &session).await?;
    Ok(Json(ApiResponse::success(orders)))
}

/// POST /api/v1/orders/:order_id/cancel
pub async fn cancel_order(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(order_id): Path<String>,
) -> Result<Json<ApiResponse<OrderRecord>>> {
    let session = authenticate(&state, &headers)?;
    let order = OrderService::cancel_order(&state, &session, &order_id).await?;
    Ok(Json(ApiResponse::success(order)))
}

// ============================================================================
// Portfolio
// ============================================================================

/// GET /api/v1/portfolio
pub async fn get_portfolio(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<PortfolioResult>>> {
    let session = authenticate(&state, &headers)?;
    let result = PortfolioService::get_portfolio(&state, &session).await?;
    Ok(Json(ApiResponse::success(result)))
}

/// POST /api/v1/portfolio
pub async fn create_position(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<CreatePositionRequest>,
) -> Result<Json<ApiResponse<PortfolioRecord>>> {
    let session = authenticate(&state, &headers)?;

    let position = PortfolioService::create_position(
        &state,
        &session,
        &payload.stock_code,
        payload.quantity,
        payload.avg_price,
    )
    .await?;

    Ok(Json(ApiResponse::success(position)))
}

// ============================================================================
// Market data
// ============================================================================

/// GET /api/v1/quotes/:code?market=ashare
pub async fn get_quote(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    Query(query): Query<QuoteQuery>,
) -> Result<Json<ApiResponse<QuoteEnvelope>>> {
    let envelope = state.market.get_quote(&code, query.market).await;
    Ok(Json(ApiResponse::success(envelope)))
}

/// GET /api/v1/market/:market
pub async fn get_market_list(
    State(state): State<Arc<AppState>>,
    Path(market): Path<String>,
) -> Result<Json<ApiResponse<Vec<QuoteEnvelope>>>> {
    let market: MarketType = market.parse()?;
    let list = state.market.get_market_list(market).await;
    Ok(Json(ApiResponse::success(list)))
}

/// GET /api/v1/quota
pub async fn get_quota(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<QuotaStatus>>> {
    Ok(Json(ApiResponse::success(state.market.quota_status())))
}

// ============================================================================
// Assistant
// ============================================================================

/// POST /api/v1/assistant
pub async fn assistant(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AssistantRequest>,
) -> Result<Json<ApiResponse<AssistantReply>>> {
    let reply = AssistantService::analyze(
        &state,
        &payload.query,
        payload.stock_code.as_deref(),
        payload.market,
    )
    .await?;

    Ok(Json(ApiResponse::success(reply)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_with_and_without_prefix() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", "Bearer tok-abc".parse().unwrap());
        assert_eq!(bearer_token(&headers).unwrap(), "tok-abc");

        let mut headers = HeaderMap::new();
        headers.insert("Authorization", "tok-abc".parse().unwrap());
        assert_eq!(bearer_token(&headers).unwrap(), "tok-abc");
    }

    #[test]
    fn test_missing_token_is_auth_error() {
        let headers = HeaderMap::new();
        assert!(matches!(
            bearer_token(&headers).unwrap_err(),
            AppError::Auth(_)
        ));

        let mut headers = HeaderMap::new();
        headers.insert("Authorization", "Bearer ".parse().unwrap());
        assert!(matches!(
            bearer_token(&headers).unwrap_err(),
            AppError::Auth(_)
        ));
    }
}
