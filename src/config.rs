//! Process configuration
//!
//! Everything is read from the environment once at startup. There is no
//! further configuration contract after that point.

use crate::error::{AppError, Result};

/// Server configuration, read from the environment at startup
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address for the HTTP/WebSocket server
    pub host: String,
    pub port: u16,

    /// Base URL of the BaaS (PocketBase-style collection API)
    pub baas_url: String,

    /// Base URL of the third-party quote API
    pub quote_api_url: String,

    /// Token passed as a query parameter on quote API calls
    pub quote_api_token: String,

    /// Daily ceiling on outbound quote API calls
    pub daily_request_limit: u32,

    /// Interval between mock feed pushes, in seconds
    pub feed_interval_secs: u64,
}

impl Config {
    /// Load configuration from environment variables, with defaults
    /// matching a local development setup.
    pub fn from_env() -> Result<Self> {
        let host = env_or("PAPERTRADE_HOST", "127.0.0.1");
        let port = env_or("PAPERTRADE_PORT", "8787")
            .parse::<u16>()
            .map_err(|e| AppError::Config(format!("Invalid PAPERTRADE_PORT: {}", e)))?;

        let daily_request_limit = env_or("QUOTE_DAILY_LIMIT", "200")
            .parse::<u32>()
            .map_err(|e| AppError::Config(format!("Invalid QUOTE_DAILY_LIMIT: {}", e)))?;

        let feed_interval_secs = env_or("FEED_INTERVAL_SECS", "3")
            .parse::<u64>()
            .map_err(|e| AppError::Config(format!("Invalid FEED_INTERVAL_SECS: {}", e)))?;

        Ok(Self {
            host,
            port,
            baas_url: env_or("BAAS_URL", "http://127.0.0.1:8090"),
            quote_api_url: env_or("QUOTE_API_URL", "https://api.zhituapi.com"),
            quote_api_token: env_or("QUOTE_API_TOKEN", ""),
            daily_request_limit,
            feed_interval_secs,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
