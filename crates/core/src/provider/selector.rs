//! Active provider selection.

use serde::Serialize;
use tracing::info;

use super::types::{Provider, ProviderStatus};
use crate::metrics::FALLBACK_NOTICES;

/// Outcome of one selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub active: Option<Provider>,
    pub changed: bool,
}

/// Pick the highest-priority available provider.
///
/// There is no hysteresis: a higher-priority provider coming back is taken
/// immediately.
pub fn select_active(status: &ProviderStatus, previous: Option<Provider>) -> Selection {
    let active = status.services.first_available();
    Selection {
        active,
        changed: active != previous,
    }
}

/// Why the active provider changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeReason {
    /// A status probe reported a different provider set.
    ProbeChanged,
    /// A reply was produced by a provider other than the active one.
    BackendReported,
}

impl NoticeReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeReason::ProbeChanged => "probe_changed",
            NoticeReason::BackendReported => "backend_reported",
        }
    }
}

/// A user-visible message announcing a provider switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FallbackNotice {
    pub from: Option<Provider>,
    pub to: Option<Provider>,
    pub reason: NoticeReason,
    pub message: String,
}

impl FallbackNotice {
    fn new(from: Option<Provider>, to: Option<Provider>, reason: NoticeReason) -> Self {
        let message = match (from, to) {
            (Some(from), Some(to)) => format!(
                "{} is unavailable. Switched to {}.",
                from.display_name(),
                to.display_name()
            ),
            (None, Some(to)) => format!(
                "An AI provider is available again. Switched to {}.",
                to.display_name()
            ),
            (from, None) => format!(
                "{} is unavailable and no other AI provider is available right now.",
                from.map(|p| p.display_name()).unwrap_or("The assistant")
            ),
        };

        Self {
            from,
            to,
            reason,
            message,
        }
    }
}

/// Per-session selector state.
#[derive(Debug, Clone, Default)]
pub struct ProviderSelector {
    active: Option<Provider>,
    /// Some provider has been active at least once.
    had_provider: bool,
}

impl ProviderSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<Provider> {
        self.active
    }

    /// Re-select from a fresh probe.
    pub fn update(&mut self, status: &ProviderStatus) -> Option<FallbackNotice> {
        let selection = select_active(status, self.active);
        self.transition(selection.active, NoticeReason::ProbeChanged)
    }

    /// Adopt the provider a reply says actually served it.
    pub fn report_backend_provider(&mut self, provider: Provider) -> Option<FallbackNotice> {
        self.transition(Some(provider), NoticeReason::BackendReported)
    }

    fn transition(
        &mut self,
        next: Option<Provider>,
        reason: NoticeReason,
    ) -> Option<FallbackNotice> {
        let previous = self.active;
        if previous == next {
            return None;
        }
        self.active = next;
        let announce = self.had_provider;
        self.had_provider |= next.is_some();

        info!(
            "Active provider changed: {:?} -> {:?} ({})",
            previous,
            next,
            reason.as_str()
        );

        // The first selection of a session is not a fallback.
        if !announce {
            return None;
        }

        FALLBACK_NOTICES
            .with_label_values(&[reason.as_str(), next.map(|p| p.as_str()).unwrap_or("none")])
            .inc();
        Some(FallbackNotice::new(previous, next, reason))
    }
}
