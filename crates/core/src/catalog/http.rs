//! HTTP catalog client for the marketplace REST API.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use super::types::{normalize_results, FreelancerRecord, UserRecord};
use super::{CatalogError, FreelancerCatalog};
use crate::config::CatalogConfig;

/// Catalog client backed by the marketplace list endpoints.
pub struct HttpCatalogClient {
    client: Client,
    base_url: String,
    freelancers_path: String,
    users_path: String,
    api_token: Option<String>,
}

impl HttpCatalogClient {
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            freelancers_path: config.freelancers_path.clone(),
            users_path: config.users_path.clone(),
            api_token: config.api_token.clone(),
        })
    }

    async fn fetch_list(&self, path: &str) -> Result<Vec<Value>, CatalogError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Catalog list request: {}", url);

        let mut request = self.client.get(&url).header("accept", "application/json");
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| CatalogError::ParseError(format!("{}: {}", url, e)))?;

        extract_list(body).ok_or_else(|| {
            CatalogError::ParseError(format!("{}: expected a JSON array of records", url))
        })
    }
}

/// List endpoints answer with a bare array or a paginated `{results}`/`{data}` envelope.
fn extract_list(body: Value) -> Option<Vec<Value>> {
    match body {
        Value::Array(items) => Some(items),
        Value::Object(mut map) => ["results", "data", "items"]
            .iter()
            .find_map(|key| match map.remove(*key) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            }),
        _ => None,
    }
}

#[async_trait]
impl FreelancerCatalog for HttpCatalogClient {
    fn name(&self) -> &str {
        "http"
    }

    async fn list_freelancers(&self) -> Result<Vec<FreelancerRecord>, CatalogError> {
        let items = self.fetch_list(&self.freelancers_path).await?;
        let records = normalize_results(&items);
        debug!(
            "Loaded {} freelancers ({} rows)",
            records.len(),
            items.len()
        );
        Ok(records)
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>, CatalogError> {
        let items = self.fetch_list(&self.users_path).await?;
        let total = items.len();
        let users: Vec<UserRecord> = items
            .into_iter()
            .filter_map(|item| match serde_json::from_value(item) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!("Skipping malformed user record: {}", e);
                    None
                }
            })
            .collect();
        debug!("Loaded {} users ({} rows)", users.len(), total);
        Ok(users)
    }
}
