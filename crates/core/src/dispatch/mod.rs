//! Chat message dispatch and reply normalisation.

mod accessors;
mod reply;

pub use accessors::{
    first_of, lookup, FieldPath, CLARIFYING_QUESTION_PATHS, CONTENT_PATHS, MATCH_PATHS,
    NEEDS_MORE_INFO_PATHS, PROVIDER_PATHS,
};
pub use reply::{normalize_reply, NormalizedReply};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::backend::{AssistantBackend, BackendError, MessageMetadata, MessageRequest};
use crate::metrics::{DISPATCH_DURATION, DISPATCH_TOTAL};
use crate::provider::Provider;

/// A failed dispatch, tagged with its sequence number.
#[derive(Debug, thiserror::Error)]
#[error("Dispatch #{sequence} failed: {source}")]
pub struct DispatchError {
    pub sequence: u64,
    #[source]
    pub source: BackendError,
}

/// Sends chat messages to the assistant backend.
///
/// One request per call. There is no retry and no queueing; a failure is
/// returned to the caller immediately.
pub struct MessageDispatcher {
    backend: Arc<dyn AssistantBackend>,
    sequence: AtomicU64,
}

impl MessageDispatcher {
    pub fn new(backend: Arc<dyn AssistantBackend>) -> Self {
        Self {
            backend,
            sequence: AtomicU64::new(0),
        }
    }

    /// Reserve the next sequence number. Numbers start at 1 and only grow.
    pub fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Send with a freshly reserved sequence number.
    pub async fn send(
        &self,
        text: &str,
        active: Option<Provider>,
        session_id: Option<&str>,
    ) -> Result<NormalizedReply, DispatchError> {
        let sequence = self.next_sequence();
        self.send_with_sequence(sequence, text, active, session_id)
            .await
    }

    /// Send under a sequence number reserved with [`Self::next_sequence`].
    pub async fn send_with_sequence(
        &self,
        sequence: u64,
        text: &str,
        active: Option<Provider>,
        session_id: Option<&str>,
    ) -> Result<NormalizedReply, DispatchError> {
        let request = MessageRequest {
            message: text.to_string(),
            metadata: MessageMetadata {
                provider: active,
                session_id: session_id.map(str::to_string),
                sequence,
            },
        };

        let provider_label = active.map(|p| p.as_str()).unwrap_or("none");
        let timer = DISPATCH_DURATION
            .with_label_values(&[provider_label])
            .start_timer();
        let result = self.backend.send_message(&request).await;
        timer.observe_duration();

        match result {
            Ok(raw) => {
                DISPATCH_TOTAL
                    .with_label_values(&[provider_label, "ok"])
                    .inc();
                let reply = normalize_reply(&raw, sequence, active);
                debug!(
                    "Dispatch #{}: {} chars, {} matches, {} clarifying questions",
                    sequence,
                    reply.content.len(),
                    reply.freelancer_matches.len(),
                    reply.clarifying_questions.len()
                );
                Ok(reply)
            }
            Err(source) => {
                DISPATCH_TOTAL
                    .with_label_values(&[provider_label, "error"])
                    .inc();
                warn!(
                    "Dispatch #{} via '{}' failed: {}",
                    sequence,
                    self.backend.name(),
                    source
                );
                Err(DispatchError { sequence, source })
            }
        }
    }
}
