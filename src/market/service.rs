//! Market data service
//!
//! Quota-gated quote retrieval. Failures never propagate to API
//! consumers: when the daily quota is exhausted or the upstream errors,
//! the service falls back to synthetic data and flags the response.

use crate::config::Config;
use crate::market::quota::{DailyQuota, QuotaStatus};
use crate::market::source::{QuoteSource, SyntheticSource, ZhituSource};
use crate::market::types::{MarketType, QuoteSnapshot, StockListing};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Fixed HK demo codes; quoted through the same quota-gated fetch as
/// any other code
const HK_MARKET_CODES: [&str; 5] = ["09988", "03690", "00700", "09888", "01810"];

/// How many catalog entries the A-share market list quotes
const MARKET_LIST_SIZE: usize = 5;

/// A quote snapshot plus where it came from
#[derive(Debug, Clone, Serialize)]
pub struct QuoteEnvelope {
    #[serde(flatten)]
    pub quote: QuoteSnapshot,
    /// "live" or "synthetic"
    pub source: &'static str,
}

/// Market data service
pub struct MarketDataService {
    quota: DailyQuota,
    live: Arc<dyn QuoteSource>,
    synthetic: Arc<dyn QuoteSource>,
}

impl MarketDataService {
    pub fn new(config: &Config) -> Self {
        Self {
            quota: DailyQuota::new(config.daily_request_limit),
            live: Arc::new(ZhituSource::new(
                &config.quote_api_url,
                &config.quote_api_token,
            )),
            synthetic: Arc::new(SyntheticSource::new()),
        }
    }

    /// Service with an injected live source, for tests
    #[cfg(test)]
    pub fn with_source(limit: u32, live: Arc<dyn QuoteSource>) -> Self {
        Self {
            quota: DailyQuota::new(limit),
            live,
            synthetic: Arc::new(SyntheticSource::new()),
        }
    }

    /// Get a quote for one stock. Never fails: quota exhaustion and
    /// upstream errors both degrade to synthetic data.
    pub async fn get_quote(&self, code: &str, market: MarketType) -> QuoteEnvelope {
        if !self.quota.try_acquire() {
            warn!("Daily quote request limit reached, serving synthetic data");
            return self.synthetic_quote(code, market).await;
        }

        match self.live.fetch_quote(code, market).await {
            Ok(quote) => QuoteEnvelope {
                quote,
                source: self.live.id(),
            },
            Err(e) => {
                warn!("Quote fetch failed for {}: {}, serving synthetic data", code, e);
                self.synthetic_quote(code, market).await
            }
        }
    }

    /// Quote snapshots for a market overview. A-share quotes the first
    /// few catalog entries; HK uses a fixed demo set.
    pub async fn get_market_list(&self, market: MarketType) -> Vec<QuoteEnvelope> {
        let codes: Vec<String> = match market {
            MarketType::AShare => self
                .get_catalog()
                .await
                .into_iter()
                .take(MARKET_LIST_SIZE)
                .map(|listing| listing.code)
                .collect(),
            MarketType::Hk => HK_MARKET_CODES.iter().map(|c| c.to_string()).collect(),
        };

        let mut quotes = Vec::with_capacity(codes.len());
        for code in &codes {
            quotes.push(self.get_quote(code, market).await);
        }

        info!("Market list for {}: {} quotes", market.label(), quotes.len());
        quotes
    }

    /// Stock catalog from the live source. Empty on quota exhaustion or
    /// upstream failure.
    pub async fn get_catalog(&self) -> Vec<StockListing> {
        if !self.quota.try_acquire() {
            warn!("Daily quote request limit reached, catalog unavailable");
            return vec![];
        }

        match self.live.fetch_catalog().await {
            Ok(catalog) => catalog,
            Err(e) => {
                warn!("Catalog fetch failed: {}", e);
                vec![]
            }
        }
    }

    /// Today's quota usage
    pub fn quota_status(&self) -> QuotaStatus {
        self.quota.status()
    }

    async fn synthetic_quote(&self, code: &str, market: MarketType) -> QuoteEnvelope {
        // The synthetic source is infallible
        let quote = self
            .synthetic
            .fetch_quote(code, market)
            .await
            .unwrap_or_else(|_| SyntheticSource::snapshot(code, market));

        QuoteEnvelope {
            quote,
            source: self.synthetic.id(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Live-source stand-in that counts calls and can be told to fail
    struct FakeSource {
        calls: AtomicU32,
        fail: bool,
    }

    #[async_trait]
    impl QuoteSource for FakeSource {
        fn id(&self) -> &'static str {
            "live"
        }

        async fn fetch_quote(&self, code: &str, market: MarketType) -> Result<QuoteSnapshot> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(crate::error::AppError::Internal("upstream down".into()));
            }
            let mut quote = SyntheticSource::snapshot(code, market);
            quote.price = 42.0;
            Ok(quote)
        }

        async fn fetch_catalog(&self) -> Result<Vec<StockListing>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![StockListing {
                code: "000001".into(),
                name: "Ping An Bank".into(),
                exchange: "SZ".into(),
            }])
        }
    }

    #[tokio::test]
    async fn test_quota_exhaustion_serves_synthetic() {
        let source = Arc::new(FakeSource {
            calls: AtomicU32::new(0),
            fail: false,
        });
        let service = MarketDataService::with_source(2, source.clone());

        let first = service.get_quote("000001", MarketType::AShare).await;
        assert_eq!(first.source, "live");
        assert_eq!(first.quote.price, 42.0);

        let _ = service.get_quote("000001", MarketType::AShare).await;

        // Quota of 2 is spent; third call must not hit the live source
        let third = service.get_quote("000001", MarketType::AShare).await;
        assert_eq!(third.source, "synthetic");
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_upstream_failure_serves_synthetic() {
        let source = Arc::new(FakeSource {
            calls: AtomicU32::new(0),
            fail: true,
        });
        let service = MarketDataService::with_source(10, source);

        let envelope = service.get_quote("600000", MarketType::AShare).await;
        assert_eq!(envelope.source, "synthetic");
        assert_eq!(envelope.quote.code, "600000");
    }

    #[tokio::test]
    async fn test_hk_market_list_uses_fixed_codes() {
        let source = Arc::new(FakeSource {
            calls: AtomicU32::new(0),
            fail: false,
        });
        let service = MarketDataService::with_source(100, source);

        let list = service.get_market_list(MarketType::Hk).await;
        assert_eq!(list.len(), HK_MARKET_CODES.len());
        assert_eq!(list[0].quote.code, "09988");
    }

    #[tokio::test]
    async fn test_catalog_empty_when_quota_spent() {
        let source = Arc::new(FakeSource {
            calls: AtomicU32::new(0),
            fail: false,
        });
        let service = MarketDataService::with_source(0, source.clone());

        assert!(service.get_catalog().await.is_empty());
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }
}
