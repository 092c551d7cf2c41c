//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the external service traits,
//! allowing end-to-end tests of a chat turn without a real backend or catalog.
//!
//! # Example
//!
//! ```rust,ignore
//! use hirewire_core::testing::{fixtures, MockAssistantBackend, MockFreelancerCatalog};
//!
//! let backend = MockAssistantBackend::new();
//! let catalog = MockFreelancerCatalog::new();
//!
//! // Configure mock responses
//! backend.set_status(fixtures::status(false, true, false)).await;
//! catalog.set_freelancers(vec![fixtures::freelancer(42, Some("Ada Lovelace"))]).await;
//! ```

mod mock_backend;
mod mock_catalog;

pub use mock_backend::MockAssistantBackend;
pub use mock_catalog::MockFreelancerCatalog;

/// Test fixtures and helper functions.
pub mod fixtures {
    use serde_json::{json, Value};

    use crate::catalog::{FreelancerRecord, UserRecord};

    /// Create a freelancer record with reasonable defaults and no sub-scores.
    pub fn freelancer(id: u64, display_name: Option<&str>) -> FreelancerRecord {
        FreelancerRecord {
            id,
            display_name: display_name.map(str::to_string),
            profession: Some("Software Engineer".to_string()),
            skills: ["Rust", "SQL"].iter().map(|s| s.to_string()).collect(),
            hourly_rate: Some(85.0),
            location: Some("Remote".to_string()),
            rating: Some(4.8),
            years_of_experience: Some(6.0),
            ..Default::default()
        }
    }

    /// Create a freelancer record with all four sub-scores set.
    pub fn scored_freelancer(
        id: u64,
        display_name: &str,
        job_performance: f64,
        skills_experience: f64,
        responsiveness: f64,
        fairness_score: f64,
    ) -> FreelancerRecord {
        FreelancerRecord {
            job_performance: Some(job_performance),
            skills_experience: Some(skills_experience),
            responsiveness: Some(responsiveness),
            fairness_score: Some(fairness_score),
            ..freelancer(id, Some(display_name))
        }
    }

    /// Create a user record.
    pub fn user(id: u64, username: &str, first_name: &str, last_name: &str) -> UserRecord {
        UserRecord {
            id,
            username: Some(username.to_string()),
            first_name: Some(first_name.to_string()),
            last_name: Some(last_name.to_string()),
        }
    }

    /// A `/status` payload with the given provider flags.
    pub fn status(deepseek: bool, anthropic: bool, ollama: bool) -> Value {
        json!({
            "available": deepseek || anthropic || ollama,
            "services": {
                "deepseek": deepseek,
                "anthropic": anthropic,
                "ollama": ollama,
                "legacy": false
            }
        })
    }

    /// A `/message` reply carrying `matches` under `metadata.matches`.
    pub fn reply(content: &str, matches: &[FreelancerRecord]) -> Value {
        json!({
            "content": content,
            "metadata": {
                "matches": matches,
                "needsMoreInfo": false
            }
        })
    }

    /// A `/message` reply that says which provider served it.
    pub fn reply_from(content: &str, provider: &str) -> Value {
        json!({
            "content": content,
            "metadata": { "provider": provider }
        })
    }

    /// A reply asking the user for more detail.
    pub fn clarifying_reply(content: &str, questions: &[&str]) -> Value {
        json!({
            "content": content,
            "clarifyingQuestions": questions,
            "metadata": { "needsMoreInfo": true }
        })
    }
}
