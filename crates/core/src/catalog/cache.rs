//! Time-bounded cache of catalog entries in front of any catalog source.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::types::CatalogEntry;
use super::{load_catalog_entries, CatalogError, FreelancerCatalog};

struct Snapshot {
    loaded_at: Instant,
    entries: Arc<Vec<CatalogEntry>>,
}

/// Caches the merged freelancer/user entries for `ttl`.
///
/// A failed reload is returned to the caller as-is; the previous snapshot is
/// not served past its TTL. A zero TTL disables caching.
pub struct CachedCatalog {
    source: Arc<dyn FreelancerCatalog>,
    ttl: Duration,
    snapshot: RwLock<Option<Snapshot>>,
}

impl CachedCatalog {
    pub fn new(source: Arc<dyn FreelancerCatalog>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            snapshot: RwLock::new(None),
        }
    }

    /// The underlying source.
    pub fn source(&self) -> &Arc<dyn FreelancerCatalog> {
        &self.source
    }

    /// Current entries, reloading from the source when the snapshot is missing or expired.
    pub async fn entries(&self) -> Result<Arc<Vec<CatalogEntry>>, CatalogError> {
        if let Some(entries) = self.fresh_entries().await {
            return Ok(entries);
        }

        let mut guard = self.snapshot.write().await;
        // Another caller may have reloaded while we waited for the write lock.
        if let Some(snapshot) = guard.as_ref() {
            if self.is_fresh(snapshot) {
                return Ok(Arc::clone(&snapshot.entries));
            }
        }

        match load_catalog_entries(self.source.as_ref()).await {
            Ok(entries) => {
                debug!(
                    "Catalog '{}' loaded with {} entries",
                    self.source.name(),
                    entries.len()
                );
                let entries = Arc::new(entries);
                *guard = Some(Snapshot {
                    loaded_at: Instant::now(),
                    entries: Arc::clone(&entries),
                });
                Ok(entries)
            }
            Err(e) => {
                warn!("Catalog '{}' failed to load: {}", self.source.name(), e);
                *guard = None;
                Err(e)
            }
        }
    }

    /// Drop the cached snapshot so the next call reloads.
    pub async fn invalidate(&self) {
        *self.snapshot.write().await = None;
    }

    async fn fresh_entries(&self) -> Option<Arc<Vec<CatalogEntry>>> {
        let guard = self.snapshot.read().await;
        guard
            .as_ref()
            .filter(|snapshot| self.is_fresh(snapshot))
            .map(|snapshot| Arc::clone(&snapshot.entries))
    }

    fn is_fresh(&self, snapshot: &Snapshot) -> bool {
        !self.ttl.is_zero() && snapshot.loaded_at.elapsed() < self.ttl
    }
}
