//! Chat session state.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::catalog::FreelancerRecord;
use crate::dispatch::{DispatchError, NormalizedReply};
use crate::mention::ResolvedText;
use crate::metrics::STALE_REPLIES;
use crate::provider::{FallbackNotice, Provider, ProviderSelector, ProviderStatus};

/// Shown in place of a reply when the backend could not be reached.
pub const DISPATCH_ERROR_MESSAGE: &str =
    "Sorry, I couldn't reach the assistant right now. Please try again in a moment.";

/// One message in a chat.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub content: String,
    pub is_user: bool,
    pub timestamp: DateTime<Utc>,
    /// Dispatch sequence number of the turn this message belongs to.
    pub sequence: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clarifying_questions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub needs_more_info: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub freelancer_matches: Option<Vec<FreelancerRecord>>,
    /// Provider that produced an assistant reply.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<Provider>,
    pub is_error: bool,
    /// Resolved freelancer references in `content`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mentions: Option<ResolvedText>,
}

impl ChatMessage {
    fn new(content: String, is_user: bool, sequence: u64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            content,
            is_user,
            timestamp: Utc::now(),
            sequence,
            clarifying_questions: None,
            needs_more_info: None,
            freelancer_matches: None,
            provider: None,
            is_error: false,
            mentions: None,
        }
    }

    pub fn user(text: &str, sequence: u64) -> Self {
        Self::new(text.to_string(), true, sequence)
    }

    pub fn assistant(
        reply: NormalizedReply,
        provider: Option<Provider>,
        mentions: ResolvedText,
    ) -> Self {
        let mut message = Self::new(reply.content, false, reply.sequence);
        message.clarifying_questions =
            (!reply.clarifying_questions.is_empty()).then_some(reply.clarifying_questions);
        message.needs_more_info = Some(reply.needs_more_info);
        message.freelancer_matches =
            (!reply.freelancer_matches.is_empty()).then_some(reply.freelancer_matches);
        message.provider = provider;
        message.mentions = Some(mentions);
        message
    }

    pub fn error(sequence: u64) -> Self {
        let mut message = Self::new(DISPATCH_ERROR_MESSAGE.to_string(), false, sequence);
        message.is_error = true;
        message
    }
}

/// Result of applying a reply to a session.
#[derive(Debug, Clone)]
pub struct AppliedReply {
    pub message: ChatMessage,
    pub notice: Option<FallbackNotice>,
    /// A newer reply had already been applied; only the message was kept.
    pub stale: bool,
}

/// Serializable view of a session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub active_provider: Option<Provider>,
    pub status: Option<ProviderStatus>,
    pub messages: Vec<ChatMessage>,
    pub notices: Vec<FallbackNotice>,
    pub clarifying_questions: Vec<String>,
    pub needs_more_info: bool,
    pub freelancer_matches: Vec<FreelancerRecord>,
    pub last_applied_sequence: u64,
}

/// One user's conversation with the assistant.
///
/// The message list is append-only. Reply-derived state (active provider,
/// latest clarifying questions and matches) only moves forward: a reply
/// whose sequence number is not newer than the last applied one is
/// appended but otherwise ignored.
#[derive(Debug, Clone)]
pub struct ChatSession {
    id: String,
    created_at: DateTime<Utc>,
    messages: Vec<ChatMessage>,
    selector: ProviderSelector,
    status: Option<ProviderStatus>,
    status_stale: bool,
    notices: Vec<FallbackNotice>,
    last_issued: u64,
    last_applied: u64,
    clarifying_questions: Vec<String>,
    needs_more_info: bool,
    freelancer_matches: Vec<FreelancerRecord>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string())
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created_at: Utc::now(),
            messages: Vec::new(),
            selector: ProviderSelector::new(),
            status: None,
            status_stale: false,
            notices: Vec::new(),
            last_issued: 0,
            last_applied: 0,
            clarifying_questions: Vec::new(),
            needs_more_info: false,
            freelancer_matches: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn active_provider(&self) -> Option<Provider> {
        self.selector.active()
    }

    pub fn status(&self) -> Option<&ProviderStatus> {
        self.status.as_ref()
    }

    /// Every fallback notice surfaced in this session, oldest first.
    pub fn notices(&self) -> &[FallbackNotice] {
        &self.notices
    }

    pub fn last_issued_sequence(&self) -> u64 {
        self.last_issued
    }

    pub fn last_applied_sequence(&self) -> u64 {
        self.last_applied
    }

    pub fn clarifying_questions(&self) -> &[String] {
        &self.clarifying_questions
    }

    pub fn needs_more_info(&self) -> bool {
        self.needs_more_info
    }

    pub fn freelancer_matches(&self) -> &[FreelancerRecord] {
        &self.freelancer_matches
    }

    /// Whether the next turn should probe first: never probed, or the last dispatch failed.
    pub fn needs_probe(&self) -> bool {
        self.status.is_none() || self.status_stale
    }

    /// Record a fresh probe and re-select the active provider.
    pub fn apply_status(&mut self, status: ProviderStatus) -> Option<FallbackNotice> {
        self.status = Some(status);
        self.status_stale = false;
        let notice = self.selector.update(&status);
        if let Some(notice) = &notice {
            self.notices.push(notice.clone());
        }
        notice
    }

    /// Append the user's message for the turn dispatched under `sequence`.
    pub fn begin_turn(&mut self, text: &str, sequence: u64) -> &ChatMessage {
        self.last_issued = self.last_issued.max(sequence);
        self.messages.push(ChatMessage::user(text, sequence));
        &self.messages[self.messages.len() - 1]
    }

    /// Append the assistant reply and, unless it is stale, adopt its state.
    pub fn complete_turn(
        &mut self,
        reply: NormalizedReply,
        mentions: ResolvedText,
    ) -> AppliedReply {
        let stale = reply.sequence <= self.last_applied;
        let mut notice = None;

        if stale {
            STALE_REPLIES.inc();
            debug!(
                "Session {}: reply #{} is older than applied #{}",
                self.id, reply.sequence, self.last_applied
            );
        } else {
            self.last_applied = reply.sequence;
            if reply.implicit_fallback {
                if let Some(provider) = reply.reported_provider {
                    notice = self.selector.report_backend_provider(provider);
                }
            }
            if let Some(notice) = &notice {
                self.notices.push(notice.clone());
            }
            self.clarifying_questions = reply.clarifying_questions.clone();
            self.needs_more_info = reply.needs_more_info;
            self.freelancer_matches = reply.freelancer_matches.clone();
        }

        let provider = reply.reported_provider.or(self.selector.active());
        let message = ChatMessage::assistant(reply, provider, mentions);
        self.messages.push(message.clone());

        AppliedReply {
            message,
            notice,
            stale,
        }
    }

    /// Append an apologetic assistant message for a failed dispatch.
    ///
    /// The provider status is marked stale so the next turn probes again.
    pub fn fail_turn(&mut self, error: &DispatchError) -> ChatMessage {
        self.status_stale = true;
        let message = ChatMessage::error(error.sequence);
        self.messages.push(message.clone());
        message
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id.clone(),
            created_at: self.created_at,
            active_provider: self.active_provider(),
            status: self.status,
            messages: self.messages.clone(),
            notices: self.notices.clone(),
            clarifying_questions: self.clarifying_questions.clone(),
            needs_more_info: self.needs_more_info,
            freelancer_matches: self.freelancer_matches.clone(),
            last_applied_sequence: self.last_applied,
        }
    }
}
