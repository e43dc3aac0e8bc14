//! Auth Service
//!
//! Registration and login. Credential checking and password storage are
//! entirely the BaaS's job; this layer only runs the form-level
//! validation the frontend used to do and caches the resulting session.

use crate::baas::AccountRecord;
use crate::error::{AppError, Result};
use crate::state::{AppState, UserSession};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Minimum accepted password length
const MIN_PASSWORD_LEN: usize = 6;

/// Simulated funds granted when registration does not specify any
const DEFAULT_INITIAL_FUNDS: f64 = 100_000.0;

/// Result of registering an account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResult {
    pub success: bool,
    pub account: AccountRecord,
}

/// Result of logging in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResult {
    pub success: bool,
    pub token: String,
    pub account: AccountRecord,
}

/// Auth service for business logic
pub struct AuthService;

impl AuthService {
    /// Register a new account with the BaaS.
    ///
    /// Rejects mismatched or too-short passwords before anything
    /// leaves the process.
    pub async fn register(
        state: &AppState,
        username: &str,
        email: &str,
        password: &str,
        password_confirm: &str,
        initial_funds: Option<f64>,
    ) -> Result<RegisterResult> {
        info!("AuthService::register - {}", username);

        Self::validate_password(password, password_confirm)?;

        if username.trim().is_empty() {
            return Err(AppError::Validation("Username is required".to_string()));
        }

        let balance = match initial_funds {
            Some(funds) if funds < 0.0 => {
                return Err(AppError::Validation(
                    "Initial funds cannot be negative".to_string(),
                ))
            }
            Some(funds) => funds,
            None => DEFAULT_INITIAL_FUNDS,
        };

        let account = state
            .baas
            .register(username.trim(), email.trim(), password, balance)
            .await?;

        Ok(RegisterResult {
            success: true,
            account,
        })
    }

    /// Log in against the BaaS and cache the session
    pub async fn login(state: &AppState, identity: &str, password: &str) -> Result<LoginResult> {
        info!("AuthService::login - {}", identity);

        let auth = state.baas.auth_with_password(identity, password).await?;

        state.put_session(UserSession::new(&auth.token, &auth.account));

        Ok(LoginResult {
            success: true,
            token: auth.token,
            account: auth.account,
        })
    }

    /// Drop the cached session. Idempotent.
    pub fn logout(state: &AppState, token: &str) {
        if state.remove_session(token) {
            info!("AuthService::logout - session dropped");
        }
    }

    /// Fetch the current account record for a session
    pub async fn get_account(state: &AppState, session: &UserSession) -> Result<AccountRecord> {
        state.baas.get_account(&session.token, &session.user_id).await
    }

    /// Set the session's simulated balance. Rejects negative or
    /// non-finite amounts before anything reaches the BaaS.
    pub async fn update_balance(
        state: &AppState,
        session: &UserSession,
        balance: f64,
    ) -> Result<AccountRecord> {
        if !balance.is_finite() || balance < 0.0 {
            return Err(AppError::Validation(
                "Balance must be a non-negative number".to_string(),
            ));
        }

        info!("AuthService::update_balance - {}", session.username);

        state
            .baas
            .update_balance(&session.token, &session.user_id, balance)
            .await
    }

    fn validate_password(password: &str, password_confirm: &str) -> Result<()> {
        if password != password_confirm {
            return Err(AppError::Validation("Passwords do not match".to_string()));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AppError::Validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        Ok(())
    }
}
