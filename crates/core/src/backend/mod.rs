//! Transport to the assistant backend.
//!
//! The backend fronts the interchangeable AI providers behind two endpoints:
//! a status probe and a chat message endpoint. Payloads are returned as raw
//! JSON; canonicalising them is the job of [`crate::provider`] and
//! [`crate::dispatch`].

mod http;

pub use http::HttpAssistantBackend;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use crate::provider::Provider;

/// Error type for backend requests.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),
}

/// Body of `POST /message`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageRequest {
    pub message: String,
    pub metadata: MessageMetadata,
}

/// Routing hints sent alongside a message.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageMetadata {
    /// Provider the client believes is active.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<Provider>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Client-side dispatch sequence number.
    pub sequence: u64,
}

/// Trait for assistant backends.
#[async_trait]
pub trait AssistantBackend: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// `GET /status`: the raw provider availability payload.
    async fn fetch_status(&self) -> Result<Value, BackendError>;

    /// `POST /message`: the raw reply envelope.
    async fn send_message(&self, request: &MessageRequest) -> Result<Value, BackendError>;
}
