//! AI provider availability and selection.
//!
//! The assistant backend fronts DeepSeek, Anthropic Claude and Ollama. The
//! probe canonicalises the backend's status report; the selector turns it
//! into one active provider per session and announces changes.

mod probe;
mod selector;
mod types;

pub use probe::{apply_dev_override, normalize_status, ProbeConfig, ProviderAvailabilityProbe};
pub use selector::{select_active, FallbackNotice, NoticeReason, ProviderSelector, Selection};
pub use types::{Provider, ProviderStatus, ServiceFlags};
