//! Assistant Service
//!
//! The "AI" trading assistant. Replies are canned text assembled from
//! the current quote snapshot; there is no model and no external call.

use crate::error::{AppError, Result};
use crate::market::MarketType;
use crate::state::AppState;
use rand::seq::SliceRandom;
use serde::Serialize;
use tracing::info;

/// Support/resistance bands around the current price
const SUPPORT_FACTOR: f64 = 0.98;
const RESISTANCE_FACTOR: f64 = 1.02;

const RISK_NOTES: [&str; 3] = [
    "Market swings can lead to losses; consider setting a stop-loss.",
    "Past movement is no guarantee of future prices; size positions carefully.",
    "Liquidity can thin out quickly; avoid committing all available funds at once.",
];

/// Assistant reply for one query
#[derive(Debug, Clone, Serialize)]
pub struct AssistantReply {
    pub stock_code: String,
    pub reply: String,
    /// "live" or "synthetic", from the quote backing the analysis
    pub source: &'static str,
}

/// Assistant service for canned analysis
pub struct AssistantService;

impl AssistantService {
    /// Analyze a stock for a free-text query.
    ///
    /// A stock code embedded in the query wins over the explicitly
    /// selected one; with neither, the default dashboard stock is used.
    pub async fn analyze(
        state: &AppState,
        query: &str,
        selected_code: Option<&str>,
        market: MarketType,
    ) -> Result<AssistantReply> {
        if query.trim().is_empty() {
            return Err(AppError::Validation("Query is required".to_string()));
        }

        let code = extract_stock_code(query)
            .or_else(|| selected_code.map(|c| c.to_string()))
            .unwrap_or_else(|| "000001".to_string());

        info!("AssistantService::analyze - {} ({})", code, market.label());

        let envelope = state.market.get_quote(&code, market).await;
        let quote = &envelope.quote;

        let trend = if quote.change >= 0.0 { "bullish" } else { "bearish" };
        let direction = if quote.change >= 0.0 { "up" } else { "down" };
        let suggestion = if quote.change >= 0.0 {
            "consider buying on dips"
        } else {
            "consider selling into strength"
        };

        let risk = RISK_NOTES
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(RISK_NOTES[0]);

        let reply = format!(
            "**{code} analysis**\n\n\
             Based on current market data, {code} trades at {price:.2}, \
             {direction} {change:.2}% on the day.\n\n\
             Technical read:\n\
             - Short-term trend: {trend}\n\
             - Support: {support:.2}\n\
             - Resistance: {resistance:.2}\n\
             - Watch for volume changes\n\n\
             **Risk**: {risk}\n\
             **Suggestion**: {suggestion}",
            code = code,
            price = quote.price,
            direction = direction,
            change = quote.change_percent.abs(),
            trend = trend,
            support = quote.price * SUPPORT_FACTOR,
            resistance = quote.price * RESISTANCE_FACTOR,
            risk = risk,
            suggestion = suggestion,
        );

        Ok(AssistantReply {
            stock_code: code,
            reply,
            source: envelope.source,
        })
    }
}

/// Pull the first 5-6 digit stock code out of a free-text query
fn extract_stock_code(query: &str) -> Option<String> {
    let mut digits = String::new();
    for ch in query.chars().chain(std::iter::once(' ')) {
        if ch.is_ascii_digit() {
            digits.push(ch);
        } else {
            if digits.len() == 5 || digits.len() == 6 {
                return Some(digits);
            }
            digits.clear();
        }
    }
    None
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
            daily_request_limit: 0,
            feed_interval_secs: 3,
        })
    }

    #[test]
    fn test_extract_stock_code() {
        assert_eq!(extract_stock_code("analyze 000001"), Some("000001".into()));
        assert_eq!(
            extract_stock_code("what about 09988 today?"),
            Some("09988".into())
        );
        assert_eq!(extract_stock_code("help me set a stop loss"), None);
        // Too short / too long digit runs are not codes
        assert_eq!(extract_stock_code("top 10 stocks"), None);
        assert_eq!(extract_stock_code("order 12345678"), None);
    }

    #[tokio::test]
    async fn test_analyze_mentions_code_and_levels() {
        // Quota limit of 0 forces the synthetic path, no network needed
        let state = test_state();

        let reply = AssistantService::analyze(&state, "analyze 000001", None, MarketType::AShare)
            .await
            .unwrap();

        assert_eq!(reply.stock_code, "000001");
        assert_eq!(reply.source, "synthetic");
        assert!(reply.reply.contains("000001"));
        assert!(reply.reply.contains("Support"));
        assert!(reply.reply.contains("Resistance"));
        assert!(reply.reply.contains("Risk"));
    }

    #[tokio::test]
    async fn test_analyze_falls_back_to_selected_stock() {
        let state = test_state();

        let reply = AssistantService::analyze(
            &state,
            "how does it look today?",
            Some("00700"),
            MarketType::Hk,
        )
        .await
        .unwrap();

        assert_eq!(reply.stock_code, "00700");
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let state = test_state();
        let err = AssistantService::analyze(&state, "  ", None, MarketType::AShare)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
