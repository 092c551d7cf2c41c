//! Mock assistant backend for testing.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use super::fixtures;
use crate::backend::{AssistantBackend, BackendError, MessageRequest};

/// A queued reply, optionally held back to simulate a slow provider.
#[derive(Debug, Clone)]
struct QueuedReply {
    body: Value,
    delay: Option<Duration>,
}

/// Mock implementation of the AssistantBackend trait.
///
/// Provides controllable behavior for testing:
/// - Return a configurable status payload
/// - Serve queued replies in order, optionally delayed
/// - Track requests for assertions
/// - Simulate failures
///
/// # Example
///
/// ```rust,ignore
/// use hirewire_core::testing::{MockAssistantBackend, fixtures};
///
/// let backend = MockAssistantBackend::new();
/// backend.set_status(fixtures::status(false, true, false)).await;
/// backend.queue_reply(fixtures::reply("Here are two options", &[])).await;
/// ```
#[derive(Debug)]
pub struct MockAssistantBackend {
    /// Payload served by `/status`.
    status: Arc<RwLock<Value>>,
    /// If set, every status probe fails with this message.
    status_error: Arc<RwLock<Option<String>>>,
    /// Replies served by `/message`, oldest first.
    replies: Arc<RwLock<VecDeque<QueuedReply>>>,
    /// If set, the next message fails with this message.
    next_message_error: Arc<RwLock<Option<String>>>,
    /// Recorded message requests.
    requests: Arc<RwLock<Vec<MessageRequest>>>,
    /// Number of status probes served.
    status_calls: Arc<RwLock<usize>>,
}

impl Default for MockAssistantBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAssistantBackend {
    /// Create a mock with every provider up and no queued replies.
    pub fn new() -> Self {
        Self {
            status: Arc::new(RwLock::new(fixtures::status(true, true, true))),
            status_error: Arc::new(RwLock::new(None)),
            replies: Arc::new(RwLock::new(VecDeque::new())),
            next_message_error: Arc::new(RwLock::new(None)),
            requests: Arc::new(RwLock::new(Vec::new())),
            status_calls: Arc::new(RwLock::new(0)),
        }
    }

    // =========================================================================
    // Status Configuration
    // =========================================================================

    /// Set the status payload and clear any status failure.
    pub async fn set_status(&self, status: Value) {
        *self.status.write().await = status;
        *self.status_error.write().await = None;
    }

    /// Make every status probe fail until `set_status` is called.
    pub async fn fail_status(&self, message: &str) {
        *self.status_error.write().await = Some(message.to_string());
    }

    /// Number of status probes served so far.
    pub async fn status_calls(&self) -> usize {
        *self.status_calls.read().await
    }

    // =========================================================================
    // Message Configuration
    // =========================================================================

    /// Queue a reply. Replies are served in order; with none queued an empty reply is served.
    pub async fn queue_reply(&self, body: Value) {
        self.replies
            .write()
            .await
            .push_back(QueuedReply { body, delay: None });
    }

    /// Queue a reply that is returned only after `delay`.
    pub async fn queue_delayed_reply(&self, body: Value, delay: Duration) {
        self.replies.write().await.push_back(QueuedReply {
            body,
            delay: Some(delay),
        });
    }

    /// Make the next message fail.
    pub async fn fail_next_message(&self, message: &str) {
        *self.next_message_error.write().await = Some(message.to_string());
    }

    /// All message requests received so far.
    pub async fn recorded_requests(&self) -> Vec<MessageRequest> {
        self.requests.read().await.clone()
    }

    /// Clear recorded requests.
    pub async fn clear_requests(&self) {
        self.requests.write().await.clear();
    }
}

#[async_trait]
impl AssistantBackend for MockAssistantBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_status(&self) -> Result<Value, BackendError> {
        *self.status_calls.write().await += 1;

        if let Some(message) = self.status_error.read().await.clone() {
            return Err(BackendError::Http(message));
        }
        Ok(self.status.read().await.clone())
    }

    async fn send_message(&self, request: &MessageRequest) -> Result<Value, BackendError> {
        self.requests.write().await.push(request.clone());

        if let Some(message) = self.next_message_error.write().await.take() {
            return Err(BackendError::Http(message));
        }

        let queued = self.replies.write().await.pop_front();
        match queued {
            Some(QueuedReply { body, delay }) => {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                Ok(body)
            }
            None => Ok(fixtures::reply("", &[])),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MessageMetadata;

    fn request(message: &str) -> MessageRequest {
        MessageRequest {
            message: message.to_string(),
            metadata: MessageMetadata::default(),
        }
    }

    #[tokio::test]
    async fn test_replies_served_in_order() {
        let backend = MockAssistantBackend::new();
        backend.queue_reply(fixtures::reply("first", &[])).await;
        backend.queue_reply(fixtures::reply("second", &[])).await;

        let first = backend.send_message(&request("a")).await.unwrap();
        let second = backend.send_message(&request("b")).await.unwrap();
        let third = backend.send_message(&request("c")).await.unwrap();

        assert_eq!(first["content"], "first");
        assert_eq!(second["content"], "second");
        assert_eq!(third["content"], "");
        assert_eq!(backend.recorded_requests().await.len(), 3);
    }

    #[tokio::test]
    async fn test_next_message_error_is_one_shot() {
        let backend = MockAssistantBackend::new();
        backend.fail_next_message("boom").await;

        assert!(backend.send_message(&request("a")).await.is_err());
        assert!(backend.send_message(&request("b")).await.is_ok());
    }

    #[tokio::test]
    async fn test_status_failure_until_reset() {
        let backend = MockAssistantBackend::new();
        backend.fail_status("down").await;
        assert!(backend.fetch_status().await.is_err());
        assert!(backend.fetch_status().await.is_err());

        backend.set_status(fixtures::status(false, false, true)).await;
        let status = backend.fetch_status().await.unwrap();
        assert_eq!(status["services"]["ollama"], true);
        assert_eq!(backend.status_calls().await, 3);
    }
}
