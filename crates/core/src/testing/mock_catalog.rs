//! Mock freelancer catalog for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::catalog::{CatalogError, FreelancerCatalog, FreelancerRecord, UserRecord};

/// Mock implementation of the FreelancerCatalog trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable freelancer and user lists
/// - Count list calls for cache assertions
/// - Simulate either list failing
#[derive(Debug)]
pub struct MockFreelancerCatalog {
    freelancers: Arc<RwLock<Vec<FreelancerRecord>>>,
    users: Arc<RwLock<Vec<UserRecord>>>,
    /// If set, listing freelancers fails with this message.
    freelancer_error: Arc<RwLock<Option<String>>>,
    /// If set, listing users fails with this message.
    user_error: Arc<RwLock<Option<String>>>,
    freelancer_calls: Arc<RwLock<usize>>,
    user_calls: Arc<RwLock<usize>>,
}

impl Default for MockFreelancerCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFreelancerCatalog {
    /// Create a new empty mock catalog.
    pub fn new() -> Self {
        Self {
            freelancers: Arc::new(RwLock::new(Vec::new())),
            users: Arc::new(RwLock::new(Vec::new())),
            freelancer_error: Arc::new(RwLock::new(None)),
            user_error: Arc::new(RwLock::new(None)),
            freelancer_calls: Arc::new(RwLock::new(0)),
            user_calls: Arc::new(RwLock::new(0)),
        }
    }

    /// Replace the freelancer list.
    pub async fn set_freelancers(&self, freelancers: Vec<FreelancerRecord>) {
        *self.freelancers.write().await = freelancers;
    }

    /// Replace the user list.
    pub async fn set_users(&self, users: Vec<UserRecord>) {
        *self.users.write().await = users;
    }

    /// Make listing freelancers fail until `clear_failures` is called.
    pub async fn fail_freelancers(&self, message: &str) {
        *self.freelancer_error.write().await = Some(message.to_string());
    }

    /// Make listing users fail until `clear_failures` is called.
    pub async fn fail_users(&self, message: &str) {
        *self.user_error.write().await = Some(message.to_string());
    }

    pub async fn clear_failures(&self) {
        *self.freelancer_error.write().await = None;
        *self.user_error.write().await = None;
    }

    /// Number of `list_freelancers` calls so far.
    pub async fn freelancer_list_calls(&self) -> usize {
        *self.freelancer_calls.read().await
    }

    /// Number of `list_users` calls so far.
    pub async fn user_list_calls(&self) -> usize {
        *self.user_calls.read().await
    }
}

#[async_trait]
impl FreelancerCatalog for MockFreelancerCatalog {
    fn name(&self) -> &str {
        "mock"
    }

    async fn list_freelancers(&self) -> Result<Vec<FreelancerRecord>, CatalogError> {
        *self.freelancer_calls.write().await += 1;

        if let Some(message) = self.freelancer_error.read().await.clone() {
            return Err(CatalogError::Unavailable(message));
        }
        Ok(self.freelancers.read().await.clone())
    }

    async fn list_users(&self) -> Result<Vec<UserRecord>, CatalogError> {
        *self.user_calls.write().await += 1;

        if let Some(message) = self.user_error.read().await.clone() {
            return Err(CatalogError::Unavailable(message));
        }
        Ok(self.users.read().await.clone())
    }
}
