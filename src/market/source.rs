//! Quote sources
//!
//! `ZhituSource` talks to the third-party quote REST endpoint;
//! `SyntheticSource` fabricates plausible data. Both sit behind the
//! `QuoteSource` trait so the service can degrade from one to the other.

use crate::error::{AppError, Result};
use crate::market::types::{MarketType, QuoteSnapshot, StockListing};
use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use reqwest::Client;
use serde::{Deserialize, Deserializer};

/// A provider of quote snapshots and the stock catalog
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Source ID, surfaced to API consumers ("live" / "synthetic")
    fn id(&self) -> &'static str;

    /// Fetch a quote snapshot for one stock code
    async fn fetch_quote(&self, code: &str, market: MarketType) -> Result<QuoteSnapshot>;

    /// Fetch the stock catalog
    async fn fetch_catalog(&self) -> Result<Vec<StockListing>>;
}

// ============================================================================
// Live source (Zhitu-style REST API)
// ============================================================================

/// Third-party quote endpoint client. The token rides along as a query
/// parameter on every call.
pub struct ZhituSource {
    client: Client,
    base_url: String,
    token: String,
}

/// The upstream sends most numeric fields as strings
fn de_flexible_f64<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flexible {
        Float(f64),
        Int(i64),
        Str(String),
    }

    match Option::<Flexible>::deserialize(deserializer)? {
        None => Ok(0.0),
        Some(Flexible::Float(f)) => Ok(f),
        Some(Flexible::Int(i)) => Ok(i as f64),
        Some(Flexible::Str(s)) => Ok(s.trim().parse().unwrap_or(0.0)),
    }
}

/// Real-time quote payload, upstream field names
#[derive(Debug, Deserialize)]
struct ZhituQuote {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    name: Option<String>,
    /// Last price
    #[serde(default, deserialize_with = "de_flexible_f64")]
    p: f64,
    /// Change
    #[serde(default, deserialize_with = "de_flexible_f64")]
    ud: f64,
    /// Change percent
    #[serde(default, deserialize_with = "de_flexible_f64")]
    pc: f64,
    #[serde(default, deserialize_with = "de_flexible_f64")]
    o: f64,
    #[serde(default, deserialize_with = "de_flexible_f64")]
    h: f64,
    #[serde(default, deserialize_with = "de_flexible_f64")]
    l: f64,
    /// Volume, in lots
    #[serde(default, deserialize_with = "de_flexible_f64")]
    v: f64,
    /// Traded value
    #[serde(default, deserialize_with = "de_flexible_f64")]
    cje: f64,
    /// Snapshot time
    #[serde(default)]
    t: Option<String>,
    #[serde(default, deserialize_with = "de_flexible_f64")]
    pe: f64,
    /// Price-to-book
    #[serde(default, deserialize_with = "de_flexible_f64")]
    sjl: f64,
    /// Turnover rate
    #[serde(default, deserialize_with = "de_flexible_f64")]
    hs: f64,
    /// Amplitude
    #[serde(default, deserialize_with = "de_flexible_f64")]
    zf: f64,
    /// Previous close
    #[serde(default, deserialize_with = "de_flexible_f64")]
    yc: f64,
}

/// Catalog entry, upstream field names
#[derive(Debug, Deserialize)]
struct ZhituListing {
    /// Code with exchange suffix, e.g. "000001.SZ"
    #[serde(default)]
    dm: Option<String>,
    /// Name
    #[serde(default)]
    mc: Option<String>,
    /// Exchange
    #[serde(default)]
    jys: Option<String>,
}

impl ZhituSource {
    pub fn new(base_url: &str, token: &str) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    fn map_quote(&self, raw: ZhituQuote, code: &str, market: MarketType) -> QuoteSnapshot {
        QuoteSnapshot {
            code: raw.code.unwrap_or_else(|| code.to_string()),
            name: raw
                .name
                .unwrap_or_else(|| format!("{} {}", market.label(), code)),
            price: raw.p,
            change: raw.ud,
            change_percent: raw.pc,
            open: raw.o,
            high: raw.h,
            low: raw.l,
            volume: raw.v as i64,
            turnover: raw.cje,
            market,
            time: raw.t.unwrap_or_else(|| Utc::now().to_rfc3339()),
            pe: raw.pe,
            pb: raw.sjl,
            turnover_rate: raw.hs,
            amplitude: raw.zf,
            prev_close: raw.yc,
        }
    }
}

#[async_trait]
impl QuoteSource for ZhituSource {
    fn id(&self) -> &'static str {
        "live"
    }

    async fn fetch_quote(&self, code: &str, market: MarketType) -> Result<QuoteSnapshot> {
        let url = format!(
            "{}/hs/real/ssjy/{}?token={}",
            self.base_url, code, self.token
        );

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(AppError::Internal(format!(
                "Quote API returned status {}",
                response.status()
            )));
        }

        let raw: ZhituQuote = response.json().await?;
        Ok(self.map_quote(raw, code, market))
    }

    async fn fetch_catalog(&self) -> Result<Vec<StockListing>> {
        let url = format!("{}/hs/list/all?token={}", self.base_url, self.token);

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(AppError::Internal(format!(
                "Quote API returned status {}",
                response.status()
            )));
        }

        let raw: Vec<ZhituListing> = response.json().await?;

        Ok(raw
            .into_iter()
            .map(|item| StockListing {
                // Strip the exchange suffix from "000001.SZ"
                code: item
                    .dm
                    .unwrap_or_default()
                    .split('.')
                    .next()
                    .unwrap_or_default()
                    .to_string(),
                name: item.mc.unwrap_or_default(),
                exchange: item.jys.unwrap_or_default(),
            })
            .filter(|listing| !listing.code.is_empty())
            .collect())
    }
}

// ============================================================================
// Synthetic source
// ============================================================================

/// Fabricates quote data around fixed reference values. Used when the
/// quota is exhausted or the upstream fails.
pub struct SyntheticSource;

impl SyntheticSource {
    pub fn new() -> Self {
        Self
    }

    /// Build a randomized snapshot around the reference values the
    /// upstream fallback path uses.
    pub fn snapshot(code: &str, market: MarketType) -> QuoteSnapshot {
        let mut rng = rand::thread_rng();

        QuoteSnapshot {
            code: code.to_string(),
            name: format!("{} {}", market.label(), code),
            price: 100.0 + (rng.gen::<f64>() - 0.5) * 20.0,
            change: (rng.gen::<f64>() - 0.5) * 5.0,
            change_percent: (rng.gen::<f64>() - 0.5) * 3.0,
            open: 100.0,
            high: 105.0,
            low: 95.0,
            volume: 1_000_000,
            turnover: 100_000_000.0,
            market,
            time: Utc::now().to_rfc3339(),
            pe: 15.0 + (rng.gen::<f64>() - 0.5) * 10.0,
            pb: 2.0 + (rng.gen::<f64>() - 0.5) * 1.0,
            turnover_rate: 1.0 + (rng.gen::<f64>() - 0.5) * 2.0,
            amplitude: 2.0 + (rng.gen::<f64>() - 0.5) * 1.0,
            prev_close: 99.0 + (rng.gen::<f64>() - 0.5) * 5.0,
        }
    }
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuoteSource for SyntheticSource {
    fn id(&self) -> &'static str {
        "synthetic"
    }

    async fn fetch_quote(&self, code: &str, market: MarketType) -> Result<QuoteSnapshot> {
        Ok(Self::snapshot(code, market))
    }

    async fn fetch_catalog(&self) -> Result<Vec<StockListing>> {
        Ok(vec![])
    }
}
