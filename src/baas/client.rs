//! PocketBase-style BaaS REST client
//!
//! Speaks the collection API: password auth on the `users` auth
//! collection, record create, filtered/sorted list, and record update.
//! The BaaS is treated as an opaque external dependency; its failures
//! surface as `AppError::Baas`.

use crate::baas::records::{AccountRecord, OrderRecord, OrderSide, OrderStatus, PortfolioRecord};
use crate::error::{AppError, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

/// Authenticated BaaS session: bearer token plus the account record
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub account: AccountRecord,
}

/// BaaS client
pub struct BaasClient {
    client: Client,
    base_url: String,
}

/// Paged list envelope returned by the collection list endpoint
#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

/// Error body returned by the BaaS on non-2xx responses
#[derive(Debug, Deserialize)]
struct BaasErrorBody {
    #[serde(default)]
    message: String,
}

impl BaasClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn records_url(&self, collection: &str) -> String {
        format!("{}/api/collections/{}/records", self.base_url, collection)
    }

    /// Turn a BaaS response into a typed record, mapping non-2xx replies
    /// to `AppError::Baas` with the upstream message when present.
    async fn read_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let message = response
            .json::<BaasErrorBody>()
            .await
            .ok()
            .filter(|b| !b.message.is_empty())
            .map(|b| b.message)
            .unwrap_or_else(|| format!("BaaS request failed with status {}", status));

        if status == reqwest::StatusCode::BAD_REQUEST && message.contains("authenticate") {
            return Err(AppError::Auth(message));
        }
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(AppError::Auth(message));
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(message));
        }
        Err(AppError::Baas(message))
    }

    // ========================================================================
    // Auth
    // ========================================================================

    /// Authenticate against the `users` collection with username/email
    /// and password.
    pub async fn auth_with_password(&self, identity: &str, password: &str) -> Result<AuthSession> {
        let url = format!(
            "{}/api/collections/users/auth-with-password",
            self.base_url
        );

        let response = self
            .client
            .post(url)
            .json(&json!({
                "identity": identity,
                "password": password,
            }))
            .send()
            .await?;

        #[derive(Deserialize)]
        struct AuthResponse {
            token: String,
            record: AccountRecord,
        }

        let auth: AuthResponse = Self::read_response(response).await?;

        Ok(AuthSession {
            token: auth.token,
            account: auth.record,
        })
    }

    /// Create a new account on the `users` auth collection. The BaaS
    /// hashes and stores the password itself.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        balance: f64,
    ) -> Result<AccountRecord> {
        let response = self
            .client
            .post(self.records_url("users"))
            .json(&json!({
                "username": username,
                "email": email,
                "password": password,
                "passwordConfirm": password,
                "balance": balance,
            }))
            .send()
            .await?;

        Self::read_response(response).await
    }

    /// Fetch an account record by id
    pub async fn get_account(&self, token: &str, user_id: &str) -> Result<AccountRecord> {
        let url = format!("{}/{}", self.records_url("users"), user_id);

        let response = self
            .client
            .get(url)
            .header("Authorization", token)
            .send()
            .await?;

        Self::read_response(response).await
    }

    /// Update an account's simulated balance
    pub async fn update_balance(
        &self,
        token: &str,
        user_id: &str,
        balance: f64,
    ) -> Result<AccountRecord> {
        let url = format!("{}/{}", self.records_url("users"), user_id);

        let response = self
            .client
            .patch(url)
            .header("Authorization", token)
            .json(&json!({ "balance": balance }))
            .send()
            .await?;

        Self::read_response(response).await
    }

    // ========================================================================
    // Orders
    // ========================================================================

    /// Persist a new order. Status is always written as `pending`.
    pub async fn create_order(
        &self,
        token: &str,
        user_id: &str,
        stock_code: &str,
        side: OrderSide,
        price: f64,
        quantity: i64,
    ) -> Result<OrderRecord> {
        let response = self
            .client
            .post(self.records_url("orders"))
            .header("Authorization", token)
            .json(&json!({
                "user_id": user_id,
                "stock_code": stock_code,
                "side": side,
                "price": price,
                "quantity": quantity,
                "status": OrderStatus::Pending,
            }))
            .send()
            .await?;

        Self::read_response(response).await
    }

    /// List a user's orders, newest first
    pub async fn list_orders(&self, token: &str, user_id: &str) -> Result<Vec<OrderRecord>> {
        self.list_records("orders", token, user_id).await
    }

    /// Fetch a single order record
    pub async fn get_order(&self, token: &str, order_id: &str) -> Result<OrderRecord> {
        let url = format!("{}/{}", self.records_url("orders"), order_id);

        let response = self
            .client
            .get(url)
            .header("Authorization", token)
            .send()
            .await?;

        Self::read_response(response).await
    }

    /// Update an order's status
    pub async fn update_order_status(
        &self,
        token: &str,
        order_id: &str,
        status: OrderStatus,
    ) -> Result<OrderRecord> {
        let url = format!("{}/{}", self.records_url("orders"), order_id);

        let response = self
            .client
            .patch(url)
            .header("Authorization", token)
            .json(&json!({ "status": status }))
            .send()
            .await?;

        Self::read_response(response).await
    }

    // ========================================================================
    // Portfolio
    // ========================================================================

    /// Create an ad-hoc portfolio entry
    pub async fn create_position(
        &self,
        token: &str,
        user_id: &str,
        stock_code: &str,
        quantity: i64,
        avg_price: f64,
    ) -> Result<PortfolioRecord> {
        let response = self
            .client
            .post(self.records_url("portfolio"))
            .header("Authorization", token)
            .json(&json!({
                "user_id": user_id,
                "stock_code": stock_code,
                "quantity": quantity,
                "avg_price": avg_price,
            }))
            .send()
            .await?;

        Self::read_response(response).await
    }

    /// List a user's portfolio entries, newest first
    pub async fn list_portfolio(&self, token: &str, user_id: &str) -> Result<Vec<PortfolioRecord>> {
        self.list_records("portfolio", token, user_id).await
    }

    // ========================================================================
    // Private Helper Methods
    // ========================================================================

    /// Full list of a user's records from `collection`, sorted `-created`
    async fn list_records<T: DeserializeOwned>(
        &self,
        collection: &str,
        token: &str,
        user_id: &str,
    ) -> Result<Vec<T>> {
        let filter = build_user_filter(user_id);
        let url = format!(
            "{}?filter={}&sort=-created&perPage=500",
            self.records_url(collection),
            urlencoding::encode(&filter)
        );

        let response = self
            .client
            .get(url)
            .header("Authorization", token)
            .send()
            .await?;

        let list: ListResponse<T> = Self::read_response(response).await?;
        Ok(list.items)
    }
}

/// Build a collection filter expression scoped to one user
fn build_user_filter(user_id: &str) -> String {
    // Single quotes in the id would break out of the filter expression
    format!("user_id='{}'", user_id.replace('\'', ""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_filter() {
        assert_eq!(build_user_filter("usr123"), "user_id='usr123'");
    }

    #[test]
    fn test_user_filter_strips_quotes() {
        assert_eq!(build_user_filter("a'b"), "user_id='ab'");
    }

    #[test]
    fn test_filter_encoding() {
        let filter = build_user_filter("usr123");
        let encoded = urlencoding::encode(&filter);
        assert_eq!(encoded, "user_id%3D%27usr123%27");
    }

    #[test]
    fn test_records_url() {
        let client = BaasClient::new("http://127.0.0.1:8090/");
        assert_eq!(
            client.records_url("orders"),
            "http://127.0.0.1:8090/api/collections/orders/records"
        );
    }

    #[test]
    fn test_list_response_defaults_items() {
        let list: ListResponse<OrderRecord> =
            serde_json::from_str("{\"page\":1,\"totalItems\":0}").unwrap();
        assert!(list.items.is_empty());
    }
}
