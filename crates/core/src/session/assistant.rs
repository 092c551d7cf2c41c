//! The chat turn coordinator.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::chat::{ChatMessage, ChatSession};
use crate::backend::AssistantBackend;
use crate::catalog::{CachedCatalog, FreelancerRecord};
use crate::dispatch::MessageDispatcher;
use crate::mention::{MentionResolver, ResolvedText};
use crate::provider::{FallbackNotice, ProbeConfig, ProviderAvailabilityProbe, ProviderStatus};
use crate::scoring::annotate_matches;

/// What one call to [`Assistant::send_message`] produced.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// The assistant message appended to the session.
    pub message: ChatMessage,
    /// Fallback notices raised during the turn, in order.
    pub notices: Vec<FallbackNotice>,
    /// The reply arrived after a newer one and did not update session state.
    pub stale: bool,
}

/// Runs chat turns: probe, select, dispatch, score, resolve.
///
/// Shared by every session. Session locks are only held for in-memory
/// updates, never across a network call.
pub struct Assistant {
    probe: ProviderAvailabilityProbe,
    dispatcher: MessageDispatcher,
    catalog: CachedCatalog,
    resolver: MentionResolver,
}

impl Assistant {
    pub fn new(
        backend: Arc<dyn AssistantBackend>,
        catalog: CachedCatalog,
        probe_config: ProbeConfig,
    ) -> Self {
        Self {
            probe: ProviderAvailabilityProbe::new(Arc::clone(&backend), probe_config),
            dispatcher: MessageDispatcher::new(backend),
            catalog,
            resolver: MentionResolver::new(),
        }
    }

    pub fn catalog(&self) -> &CachedCatalog {
        &self.catalog
    }

    pub fn resolver(&self) -> &MentionResolver {
        &self.resolver
    }

    /// Probe without touching any session.
    pub async fn probe_status(&self) -> ProviderStatus {
        self.probe.probe().await
    }

    /// Probe now and apply the result to `session`.
    pub async fn refresh_status(&self, session: &Mutex<ChatSession>) -> Option<FallbackNotice> {
        let status = self.probe.probe().await;
        session.lock().await.apply_status(status)
    }

    /// Resolve mentions in arbitrary text against the current catalog.
    pub async fn resolve_mentions(&self, text: &str, matches: &[FreelancerRecord]) -> ResolvedText {
        self.resolver
            .resolve_with_source(text, &self.catalog, matches)
            .await
    }

    /// Run one turn for `text`.
    ///
    /// Never fails: a dispatch error becomes an apologetic assistant message.
    pub async fn send_message(&self, session: &Mutex<ChatSession>, text: &str) -> TurnOutcome {
        let mut notices = Vec::new();

        let needs_probe = session.lock().await.needs_probe();
        if needs_probe {
            notices.extend(self.refresh_status(session).await);
        }

        let (sequence, active, session_id) = {
            let mut session = session.lock().await;
            let sequence = self.dispatcher.next_sequence();
            session.begin_turn(text, sequence);
            (sequence, session.active_provider(), session.id().to_string())
        };
        debug!("Session {}: turn #{} via {:?}", session_id, sequence, active);

        let mut reply = match self
            .dispatcher
            .send_with_sequence(sequence, text, active, Some(&session_id))
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                let message = session.lock().await.fail_turn(&e);
                return TurnOutcome {
                    message,
                    notices,
                    stale: false,
                };
            }
        };

        annotate_matches(&mut reply.freelancer_matches);
        let mentions = self
            .resolver
            .resolve_with_source(&reply.content, &self.catalog, &reply.freelancer_matches)
            .await;

        let applied = session.lock().await.complete_turn(reply, mentions);
        if applied.stale {
            info!(
                "Session {}: reply #{} arrived after a newer reply",
                session_id, sequence
            );
        }
        notices.extend(applied.notice);

        TurnOutcome {
            message: applied.message,
            notices,
            stale: applied.stale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mention::MentionKind;
    use crate::provider::{NoticeReason, Provider};
    use crate::testing::{fixtures, MockAssistantBackend, MockFreelancerCatalog};
    use std::time::Duration;

    async fn setup() -> (Arc<MockAssistantBackend>, Arc<MockFreelancerCatalog>, Assistant) {
        let backend = Arc::new(MockAssistantBackend::new());
        let catalog = Arc::new(MockFreelancerCatalog::new());
        catalog
            .set_freelancers(vec![
                fixtures::freelancer(42, Some("Ada Lovelace")),
                fixtures::freelancer(7, Some("Grace Hopper")),
            ])
            .await;
        let assistant = Assistant::new(
            backend.clone(),
            CachedCatalog::new(catalog.clone(), Duration::from_secs(60)),
            ProbeConfig::default(),
        );
        (backend, catalog, assistant)
    }

    #[tokio::test]
    async fn test_first_turn_probes_and_resolves() {
        let (backend, _catalog, assistant) = setup().await;
        backend
            .queue_reply(fixtures::reply(
                "I recommend [FREELANCER_ID:42].",
                &[fixtures::scored_freelancer(42, "Ada Lovelace", 90.0, 70.0, 60.0, 50.0)],
            ))
            .await;
        let session = Mutex::new(ChatSession::new());

        let outcome = assistant.send_message(&session, "Need a Rust dev").await;

        assert!(!outcome.stale);
        assert!(outcome.notices.is_empty());
        assert_eq!(backend.status_calls().await, 1);

        let message = outcome.message;
        assert_eq!(message.provider, Some(Provider::Deepseek));
        let matches = message.freelancer_matches.as_ref().unwrap();
        assert_eq!(matches[0].match_score, Some(76));

        let mentions = message.mentions.unwrap();
        let mention = mentions.mentions().next().unwrap();
        assert_eq!(mention.kind, MentionKind::Tag);
        assert!(mention.in_match_list);

        let session = session.lock().await;
        assert_eq!(session.messages().len(), 2);
        assert!(session.messages()[0].is_user);
    }

    #[tokio::test]
    async fn test_status_is_probed_once_per_session() {
        let (backend, _catalog, assistant) = setup().await;
        let session = Mutex::new(ChatSession::new());

        assistant.send_message(&session, "one").await;
        assistant.send_message(&session, "two").await;
        assert_eq!(backend.status_calls().await, 1);
    }

    #[tokio::test]
    async fn test_failed_dispatch_becomes_error_message_and_reprobes() {
        let (backend, _catalog, assistant) = setup().await;
        let session = Mutex::new(ChatSession::new());

        backend.fail_next_message("gateway timeout").await;
        let outcome = assistant.send_message(&session, "hello").await;
        assert!(outcome.message.is_error);

        backend.set_status(fixtures::status(false, false, true)).await;
        let outcome = assistant.send_message(&session, "hello again").await;
        assert!(!outcome.message.is_error);
        assert_eq!(backend.status_calls().await, 2);

        let notice = &outcome.notices[0];
        assert_eq!(notice.reason, NoticeReason::ProbeChanged);
        assert_eq!(notice.to, Some(Provider::Ollama));
        assert_eq!(session.lock().await.messages().len(), 4);
    }

    #[tokio::test]
    async fn test_backend_reported_provider_raises_notice() {
        let (backend, _catalog, assistant) = setup().await;
        backend
            .queue_reply(fixtures::reply_from("Served by Ollama", "ollama"))
            .await;
        let session = Mutex::new(ChatSession::new());

        let outcome = assistant.send_message(&session, "hi").await;
        assert_eq!(outcome.notices.len(), 1);
        assert_eq!(outcome.notices[0].reason, NoticeReason::BackendReported);
        assert_eq!(
            session.lock().await.active_provider(),
            Some(Provider::Ollama)
        );
    }

    #[tokio::test]
    async fn test_clarifying_questions_reach_the_session() {
        let (backend, _catalog, assistant) = setup().await;
        backend
            .queue_reply(fixtures::clarifying_reply(
                "Happy to help. A couple of questions first.",
                &["What is your budget?", "When do you need to start?"],
            ))
            .await;
        let session = Mutex::new(ChatSession::new());

        let outcome = assistant.send_message(&session, "I need a designer").await;
        assert_eq!(outcome.message.needs_more_info, Some(true));
        assert_eq!(
            outcome.message.clarifying_questions,
            Some(vec![
                "What is your budget?".to_string(),
                "When do you need to start?".to_string(),
            ])
        );

        let session = session.lock().await;
        assert!(session.needs_more_info());
        assert_eq!(session.clarifying_questions().len(), 2);
        assert!(session.freelancer_matches().is_empty());
    }

    #[tokio::test]
    async fn test_catalog_failure_keeps_reply_text() {
        let (backend, catalog, assistant) = setup().await;
        catalog.fail_freelancers("catalog offline").await;
        backend
            .queue_reply(fixtures::reply("Try [FREELANCER_ID:42]", &[]))
            .await;
        let session = Mutex::new(ChatSession::new());

        let outcome = assistant.send_message(&session, "hi").await;
        let mentions = outcome.message.mentions.unwrap();
        assert!(!mentions.has_mentions());
        assert_eq!(mentions, ResolvedText::literal("Try [FREELANCER_ID:42]"));
    }

    #[tokio::test]
    async fn test_slow_reply_does_not_overwrite_newer_state() {
        let (backend, _catalog, assistant) = setup().await;
        let session = Mutex::new(ChatSession::new());
        assistant.refresh_status(&session).await;

        backend
            .queue_delayed_reply(
                fixtures::reply("slow", &[fixtures::freelancer(7, Some("Grace Hopper"))]),
                Duration::from_millis(200),
            )
            .await;
        backend
            .queue_reply(fixtures::reply(
                "fast",
                &[fixtures::freelancer(42, Some("Ada Lovelace"))],
            ))
            .await;

        let (slow, fast) = tokio::join!(
            assistant.send_message(&session, "first"),
            assistant.send_message(&session, "second"),
        );

        assert!(slow.stale);
        assert!(!fast.stale);
        assert!(slow.message.sequence < fast.message.sequence);

        let session = session.lock().await;
        assert_eq!(session.messages().len(), 4);
        assert_eq!(session.last_applied_sequence(), fast.message.sequence);
        assert_eq!(session.freelancer_matches()[0].id, 42);
    }
}
