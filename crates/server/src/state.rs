use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use hirewire_core::{Assistant, ChatSession, Config, SanitizedConfig};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::info;

use crate::metrics::{CHAT_SESSIONS_CREATED_TOTAL, CHAT_SESSIONS_EVICTED_TOTAL};

/// A session shared between requests.
pub type SharedSession = Arc<Mutex<ChatSession>>;

struct SessionEntry {
    session: SharedSession,
    last_active: Instant,
}

/// Shared application state
pub struct AppState {
    config: Config,
    assistant: Arc<Assistant>,
    sessions: RwLock<HashMap<String, SessionEntry>>,
}

impl AppState {
    pub fn new(config: Config, assistant: Arc<Assistant>) -> Self {
        Self {
            config,
            assistant,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn assistant(&self) -> &Assistant {
        self.assistant.as_ref()
    }

    /// Start a new chat session and return it.
    pub async fn create_session(&self) -> SharedSession {
        let session = ChatSession::new();
        let id = session.id().to_string();
        let shared = Arc::new(Mutex::new(session));
        let entry = SessionEntry {
            session: Arc::clone(&shared),
            last_active: Instant::now(),
        };
        self.sessions.write().await.insert(id, entry);
        CHAT_SESSIONS_CREATED_TOTAL.inc();
        shared
    }

    /// Look up a session, marking it as recently used.
    pub async fn session(&self, id: &str) -> Option<SharedSession> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(id)?;
        entry.last_active = Instant::now();
        Some(Arc::clone(&entry.session))
    }

    /// Drop a session. Returns false if it did not exist.
    pub async fn remove_session(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop sessions last used before `cutoff`.
    pub async fn evict_sessions_idle_since(&self, cutoff: Instant) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_active >= cutoff);
        let evicted = before - sessions.len();
        CHAT_SESSIONS_EVICTED_TOTAL.inc_by(evicted as u64);
        evicted
    }

    /// Drop sessions untouched for longer than `idle`.
    pub async fn evict_idle_sessions(&self, idle: Duration) -> usize {
        match Instant::now().checked_sub(idle) {
            Some(cutoff) => self.evict_sessions_idle_since(cutoff).await,
            None => 0,
        }
    }
}

/// Periodically evict sessions idle for longer than `idle`.
pub fn spawn_session_reaper(
    state: Arc<AppState>,
    idle: Duration,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let evicted = state.evict_idle_sessions(idle).await;
            if evicted > 0 {
                info!("Evicted {} idle chat sessions", evicted);
            }
        }
    })
}
