//! Provider identity and availability types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the interchangeable AI providers behind the assistant backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    Deepseek,
    Anthropic,
    Ollama,
}

impl Provider {
    /// Selection priority, highest first.
    pub const PRIORITY: [Provider; 3] = [Provider::Deepseek, Provider::Anthropic, Provider::Ollama];

    /// Wire name used by the backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Deepseek => "deepseek",
            Provider::Anthropic => "anthropic",
            Provider::Ollama => "ollama",
        }
    }

    /// Name shown to users in notices.
    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::Deepseek => "DeepSeek",
            Provider::Anthropic => "Anthropic Claude",
            Provider::Ollama => "Ollama",
        }
    }

    /// Parse a backend-reported provider name. Unknown names (including "none") yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "deepseek" => Some(Provider::Deepseek),
            "anthropic" | "claude" => Some(Provider::Anthropic),
            "ollama" => Some(Provider::Ollama),
            _ => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-service availability flags as reported by `/status`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceFlags {
    pub deepseek: bool,
    pub anthropic: bool,
    pub ollama: bool,
    /// The pre-provider backend route. Not selectable as a provider.
    pub legacy: bool,
}

impl ServiceFlags {
    pub fn is_available(&self, provider: Provider) -> bool {
        match provider {
            Provider::Deepseek => self.deepseek,
            Provider::Anthropic => self.anthropic,
            Provider::Ollama => self.ollama,
        }
    }

    pub fn set(&mut self, provider: Provider, available: bool) {
        match provider {
            Provider::Deepseek => self.deepseek = available,
            Provider::Anthropic => self.anthropic = available,
            Provider::Ollama => self.ollama = available,
        }
    }

    /// Highest-priority available provider.
    pub fn first_available(&self) -> Option<Provider> {
        Provider::PRIORITY
            .into_iter()
            .find(|provider| self.is_available(*provider))
    }

    /// Whether any selectable provider is up (the legacy route does not count).
    pub fn any_provider(&self) -> bool {
        self.first_available().is_some()
    }
}

/// Canonical provider availability, recomputed on every probe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderStatus {
    pub available: bool,
    pub services: ServiceFlags,
    pub primary_service: Option<Provider>,
}

impl ProviderStatus {
    /// Everything down. Used when the probe itself fails.
    pub fn unavailable() -> Self {
        Self::default()
    }
}
