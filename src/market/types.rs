//! Common market data types

use crate::error::AppError;
use serde::{Deserialize, Serialize};

/// Market a stock trades on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketType {
    #[serde(rename = "ashare")]
    AShare,
    #[serde(rename = "hk")]
    Hk,
}

impl MarketType {
    pub fn label(&self) -> &'static str {
        match self {
            MarketType::AShare => "A-Share",
            MarketType::Hk => "HK",
        }
    }
}

impl std::str::FromStr for MarketType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ashare" | "a-share" | "a" => Ok(MarketType::AShare),
            "hk" | "hkshare" => Ok(MarketType::Hk),
            other => Err(AppError::Validation(format!("Unknown market: {}", other))),
        }
    }
}

/// Point-in-time price record for a stock code
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    pub code: String,
    pub name: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub volume: i64,
    /// Traded value for the day
    pub turnover: f64,
    pub market: MarketType,
    /// Snapshot time, RFC 3339
    pub time: String,
    pub pe: f64,
    pub pb: f64,
    pub turnover_rate: f64,
    pub amplitude: f64,
    pub prev_close: f64,
}

/// Catalog entry from the quote API's stock list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockListing {
    pub code: String,
    pub name: String,
    pub exchange: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_market_type_parse() {
        assert_eq!(MarketType::from_str("ashare").unwrap(), MarketType::AShare);
        assert_eq!(MarketType::from_str("HK").unwrap(), MarketType::Hk);
        assert!(MarketType::from_str("nyse").is_err());
    }

    #[test]
    fn test_market_type_serde() {
        assert_eq!(
            serde_json::to_string(&MarketType::AShare).unwrap(),
            "\"ashare\""
        );
    }
}
