//! Application state management

use crate::baas::{AccountRecord, BaasClient};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::market::{MarketDataService, MarketFeed};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;

/// Authenticated user session, keyed by the BaaS token
#[derive(Debug, Clone)]
pub struct UserSession {
    pub token: String,
    pub user_id: String,
    pub username: String,
    pub authenticated_at: chrono::DateTime<chrono::Utc>,
}

impl UserSession {
    pub fn new(token: &str, account: &AccountRecord) -> Self {
        Self {
            token: token.to_string(),
            user_id: account.id.clone(),
            username: account.username.clone(),
            authenticated_at: chrono::Utc::now(),
        }
    }
}

/// Application state shared across all handlers
pub struct AppState {
    /// Process configuration
    pub config: Config,

    /// BaaS client; owns all persistence and auth
    pub baas: Arc<BaasClient>,

    /// Quota-gated market data access
    pub market: Arc<MarketDataService>,

    /// Mock push channel
    pub feed: Arc<MarketFeed>,

    /// Session cache (token -> session)
    sessions: DashMap<String, UserSession>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let baas = Arc::new(BaasClient::new(&config.baas_url));
        let market = Arc::new(MarketDataService::new(&config));
        let feed = Arc::new(MarketFeed::new(Duration::from_secs(
            config.feed_interval_secs,
        )));

        Self {
            config,
            baas,
            market,
            feed,
            sessions: DashMap::new(),
        }
    }

    /// Look up a cached session by its token
    pub fn get_session(&self, token: &str) -> Option<UserSession> {
        self.sessions.get(token).map(|s| s.clone())
    }

    /// Cache a session after a successful login
    pub fn put_session(&self, session: UserSession) {
        self.sessions.insert(session.token.clone(), session);
    }

    /// Drop a session on logout. Returns whether one existed.
    pub fn remove_session(&self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    /// Resolve a session or fail with an auth error
    pub fn require_session(&self, token: &str) -> Result<UserSession> {
        self.get_session(token)
            .ok_or_else(|| AppError::Auth("Not logged in".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state() -> AppState {
        AppState::new(Config {
            host: "127.0.0.1".into(),
            port: 0,
            baas_url: "http://127.0.0.1:8090".into(),
            quote_api_url: "https://example.invalid".into(),
            quote_api_token: "".into(),
            daily_request_limit: 10,
            feed_interval_secs: 3,
        })
    }

    #[test]
    fn test_session_cache_roundtrip() {
        let state = test_state();
        let account = AccountRecord {
            id: "usr1".into(),
            username: "testuser".into(),
            email: "test@example.com".into(),
            balance: 100_000.0,
            created: String::new(),
        };

        state.put_session(UserSession::new("tok-abc", &account));
        let session = state.require_session("tok-abc").unwrap();
        assert_eq!(session.user_id, "usr1");

        assert!(state.remove_session("tok-abc"));
        assert!(state.require_session("tok-abc").is_err());
        assert!(!state.remove_session("tok-abc"));
    }
}
