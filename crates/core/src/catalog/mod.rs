//! Read-only access to the marketplace's freelancer and user catalog.
//!
//! The catalog is an external collaborator: this crate only lists records and
//! reduces them to [`CatalogEntry`] values (ID plus names) for mention
//! resolution.

mod cache;
mod http;
mod types;

pub use cache::CachedCatalog;
pub use http::HttpCatalogClient;
pub use types::{
    normalize_results, CatalogEntry, FreelancerRecord, FreelancerResult, UserRecord,
};

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur when loading the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Catalog cannot be reached or is not configured.
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}

/// Trait for catalog sources.
#[async_trait]
pub trait FreelancerCatalog: Send + Sync {
    /// Name of this source for logging.
    fn name(&self) -> &str;

    /// List all freelancer profiles.
    async fn list_freelancers(&self) -> Result<Vec<FreelancerRecord>, CatalogError>;

    /// List all user accounts.
    async fn list_users(&self) -> Result<Vec<UserRecord>, CatalogError>;
}

/// Load freelancers and users concurrently and reduce them to catalog entries.
///
/// Either list failing fails the whole load.
pub async fn load_catalog_entries(
    source: &dyn FreelancerCatalog,
) -> Result<Vec<CatalogEntry>, CatalogError> {
    let (freelancers, users) =
        futures::try_join!(source.list_freelancers(), source.list_users())?;
    Ok(build_catalog_entries(&freelancers, &users))
}

/// Build catalog entries, filling missing freelancer names from the linked user.
pub fn build_catalog_entries(
    freelancers: &[FreelancerRecord],
    users: &[UserRecord],
) -> Vec<CatalogEntry> {
    let users_by_id: HashMap<u64, &UserRecord> = users.iter().map(|u| (u.id, u)).collect();

    freelancers
        .iter()
        .map(|record| {
            let mut entry = CatalogEntry::from(record);
            if let Some(user) = record.user_id.and_then(|id| users_by_id.get(&id)) {
                if is_blank(&entry.display_name) {
                    entry.display_name = user.full_name();
                }
                if is_blank(&entry.username) {
                    entry.username = user.username.clone();
                }
            }
            entry
        })
        .collect()
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |s| s.trim().is_empty())
}
