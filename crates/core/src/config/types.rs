use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub assistant: AssistantConfig,
    pub catalog: CatalogConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Chat sessions untouched for this many seconds are dropped (0 keeps them forever).
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            session_idle_secs: default_session_idle_secs(),
        }
    }
}

impl ServerConfig {
    pub fn session_idle_timeout(&self) -> Option<Duration> {
        (self.session_idle_secs > 0).then(|| Duration::from_secs(self.session_idle_secs))
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

fn default_session_idle_secs() -> u64 {
    3600
}

/// Assistant backend configuration (the `/status` and `/message` endpoints).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AssistantConfig {
    /// Backend base URL (e.g., "http://localhost:8000/api/ai").
    pub base_url: String,
    /// Path of the provider status endpoint.
    #[serde(default = "default_status_path")]
    pub status_path: String,
    /// Path of the chat message endpoint.
    #[serde(default = "default_message_path")]
    pub message_path: String,
    /// Bearer token attached to outgoing requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    /// Treat the assistant as available regardless of what `/status` reports.
    /// Intended for local development against a partially configured backend.
    #[serde(default)]
    pub dev_mode: bool,
}

impl AssistantConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.timeout_secs))
    }
}

fn default_status_path() -> String {
    "/status".to_string()
}

fn default_message_path() -> String {
    "/message".to_string()
}

fn default_timeout() -> u32 {
    30
}

/// Freelancer/user catalog configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// Catalog API base URL.
    pub base_url: String,
    #[serde(default = "default_freelancers_path")]
    pub freelancers_path: String,
    #[serde(default = "default_users_path")]
    pub users_path: String,
    /// Bearer token attached to catalog requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    /// How long a loaded catalog snapshot is reused, in seconds (0 disables caching).
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,
}

impl CatalogConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.timeout_secs))
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_secs)
    }
}

fn default_freelancers_path() -> String {
    "/freelancers".to_string()
}

fn default_users_path() -> String {
    "/users".to_string()
}

fn default_refresh_secs() -> u64 {
    300
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub assistant: SanitizedAssistantConfig,
    pub catalog: SanitizedCatalogConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAssistantConfig {
    pub base_url: String,
    pub status_path: String,
    pub message_path: String,
    pub api_token_configured: bool,
    pub timeout_secs: u32,
    pub dev_mode: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedCatalogConfig {
    pub base_url: String,
    pub freelancers_path: String,
    pub users_path: String,
    pub api_token_configured: bool,
    pub timeout_secs: u32,
    pub refresh_secs: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        let assistant = &config.assistant;
        let catalog = &config.catalog;
        Self {
            server: config.server.clone(),
            assistant: SanitizedAssistantConfig {
                base_url: assistant.base_url.clone(),
                status_path: assistant.status_path.clone(),
                message_path: assistant.message_path.clone(),
                api_token_configured: assistant.api_token.is_some(),
                timeout_secs: assistant.timeout_secs,
                dev_mode: assistant.dev_mode,
            },
            catalog: SanitizedCatalogConfig {
                base_url: catalog.base_url.clone(),
                freelancers_path: catalog.freelancers_path.clone(),
                users_path: catalog.users_path.clone(),
                api_token_configured: catalog.api_token.is_some(),
                timeout_secs: catalog.timeout_secs,
                refresh_secs: catalog.refresh_secs,
            },
        }
    }
}
