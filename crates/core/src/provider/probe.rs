//! Provider availability probe.

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use super::types::{Provider, ProviderStatus, ServiceFlags};
use crate::backend::AssistantBackend;
use crate::metrics::{PROBES_TOTAL, PROBE_CORRECTIONS};

/// Probe behaviour switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Force the assistant available with Anthropic as primary, whatever the backend says.
    pub dev_mode: bool,
}

/// Queries `/status` and canonicalises the answer.
pub struct ProviderAvailabilityProbe {
    backend: Arc<dyn AssistantBackend>,
    config: ProbeConfig,
}

impl ProviderAvailabilityProbe {
    pub fn new(backend: Arc<dyn AssistantBackend>, config: ProbeConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> ProbeConfig {
        self.config
    }

    /// One round trip to the status endpoint. Never fails: transport and
    /// parse errors yield [`ProviderStatus::unavailable`].
    pub async fn probe(&self) -> ProviderStatus {
        let (status, failed) = match self.backend.fetch_status().await {
            Ok(raw) => (normalize_status(&raw), false),
            Err(e) => {
                warn!(
                    "Provider status probe via '{}' failed: {}",
                    self.backend.name(),
                    e
                );
                (ProviderStatus::unavailable(), true)
            }
        };

        let status = if self.config.dev_mode {
            apply_dev_override(status)
        } else {
            status
        };

        PROBES_TOTAL
            .with_label_values(&[probe_outcome(&status, failed)])
            .inc();
        debug!("Provider status: {:?}", status);
        status
    }
}

/// Metric label for one probe. Each probe counts under exactly one label.
fn probe_outcome(status: &ProviderStatus, failed: bool) -> &'static str {
    if failed {
        "failed"
    } else if status.available {
        "available"
    } else {
        "unavailable"
    }
}

/// Canonicalise a raw status payload.
///
/// Missing or mistyped fields default to `false`/none. A payload that says
/// `available: false` while a provider flag is set is corrected to available,
/// with the primary chosen by priority unless the payload named one.
pub fn normalize_status(raw: &Value) -> ProviderStatus {
    let services = raw.get("services");
    let flag = |name: &str| {
        services
            .and_then(|s| s.get(name))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    };

    let mut status = ProviderStatus {
        available: raw.get("available").and_then(Value::as_bool).unwrap_or(false),
        services: ServiceFlags {
            deepseek: flag("deepseek"),
            anthropic: flag("anthropic"),
            ollama: flag("ollama"),
            legacy: flag("legacy"),
        },
        primary_service: raw
            .get("primaryService")
            .and_then(Value::as_str)
            .and_then(Provider::parse),
    };

    if !status.available && status.services.any_provider() {
        debug!("Correcting status payload: unavailable but provider flags set");
        PROBE_CORRECTIONS.inc();
        status.available = true;
    }

    if status.available && status.primary_service.is_none() {
        status.primary_service = status.services.first_available();
    }

    status
}

/// The local-development override: available, Anthropic primary.
///
/// Providers ranked above Anthropic are cleared so that selection lands on
/// Anthropic. Lower-ranked flags are kept as fallbacks.
pub fn apply_dev_override(mut status: ProviderStatus) -> ProviderStatus {
    status.available = true;
    status.primary_service = Some(Provider::Anthropic);
    for provider in Provider::PRIORITY
        .into_iter()
        .take_while(|p| *p != Provider::Anthropic)
    {
        status.services.set(provider, false);
    }
    status.services.set(Provider::Anthropic, true);
    status
}
