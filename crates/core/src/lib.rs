pub mod backend;
pub mod catalog;
pub mod config;
pub mod dispatch;
pub mod mention;
pub mod metrics;
pub mod provider;
pub mod scoring;
pub mod session;
pub mod testing;

pub use backend::{AssistantBackend, BackendError, HttpAssistantBackend, MessageRequest};
pub use catalog::{
    CachedCatalog, CatalogEntry, CatalogError, FreelancerCatalog, FreelancerRecord,
    FreelancerResult, HttpCatalogClient, UserRecord,
};
pub use config::{
    load_config, load_config_from_str, validate_config, AssistantConfig, CatalogConfig, Config,
    ConfigError, SanitizedConfig, ServerConfig,
};
pub use dispatch::{DispatchError, MessageDispatcher, NormalizedReply};
pub use mention::{MentionResolver, ResolvedMention, ResolvedText};
pub use provider::{
    FallbackNotice, ProbeConfig, Provider, ProviderAvailabilityProbe, ProviderSelector,
    ProviderStatus,
};
pub use scoring::{annotate_matches, compute_match_score};
pub use session::{Assistant, ChatMessage, ChatSession, TurnOutcome};
