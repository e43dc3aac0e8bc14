//! Market data module
//!
//! Quote retrieval behind a daily request quota, with a synthetic
//! fallback so the API always has something to render, plus the mock
//! push feed that republishes a randomized tick every few seconds.

pub mod feed;
pub mod quota;
pub mod service;
pub mod source;
pub mod types;

pub use feed::MarketFeed;
pub use quota::DailyQuota;
pub use service::{MarketDataService, QuoteEnvelope};
pub use source::{QuoteSource, SyntheticSource, ZhituSource};
pub use types::{MarketType, QuoteSnapshot, StockListing};
