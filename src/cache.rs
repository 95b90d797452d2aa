//! Query cache — memoised backend reads keyed by resource identity.
//!
//! DESIGN
//! ======
//! Two kinds of entries: the shelter collection and one entry per shelter
//! id. A read returns the cached value while it is fresh and goes to the
//! backend otherwise. Mutations invalidate the exact keys they affect; an
//! invalidated entry keeps its value but the next read refetches.
//!
//! The store carries a generation bumped on every invalidation. A fetch that
//! started before an invalidation still stores its result, but stale, so the
//! following read goes back to the backend. Deleted shelters are forgotten
//! outright rather than marked stale.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::gateway::{GatewayError, ShelterApi};
use crate::shelter::Shelter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// The full shelter collection.
    Shelters,
    /// One shelter by id.
    Shelter(u64),
}

#[derive(Debug, Clone)]
struct Entry<T> {
    value: T,
    stale: bool,
}

#[derive(Debug, Default)]
struct CacheState {
    list: Option<Entry<Vec<Shelter>>>,
    items: HashMap<u64, Entry<Shelter>>,
    generation: u64,
}

/// Cloneable handle; clones share one store.
#[derive(Debug, Clone, Default)]
pub struct QueryCache {
    inner: Arc<RwLock<CacheState>>,
}

impl QueryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the shelter collection, fetching when absent or stale.
    ///
    /// # Errors
    ///
    /// Propagates the gateway failure; the cached entry is left untouched.
    pub async fn shelters(&self, api: &dyn ShelterApi) -> Result<Vec<Shelter>, GatewayError> {
        let key = QueryKey::Shelters;
        let generation = {
            let state = self.inner.read().await;
            if let Some(entry) = state.list.as_ref().filter(|e| !e.stale) {
                debug!(?key, "cache hit");
                return Ok(entry.value.clone());
            }
            state.generation
        };

        debug!(?key, "cache miss, fetching");
        let fresh = api.list().await?;

        let mut state = self.inner.write().await;
        let stale = state.generation != generation;
        state.list = Some(Entry { value: fresh.clone(), stale });
        Ok(fresh)
    }

    /// Read one shelter, fetching when absent or stale.
    ///
    /// # Errors
    ///
    /// Propagates the gateway failure; the cached entry is left untouched.
    pub async fn shelter(&self, api: &dyn ShelterApi, id: u64) -> Result<Shelter, GatewayError> {
        let key = QueryKey::Shelter(id);
        let generation = {
            let state = self.inner.read().await;
            if let Some(entry) = state.items.get(&id).filter(|e| !e.stale) {
                debug!(?key, "cache hit");
                return Ok(entry.value.clone());
            }
            state.generation
        };

        debug!(?key, "cache miss, fetching");
        let fresh = api.get(id).await?;

        let mut state = self.inner.write().await;
        let stale = state.generation != generation;
        state.items.insert(id, Entry { value: fresh.clone(), stale });
        Ok(fresh)
    }

    /// Mark `key` stale. The next read of that key goes to the backend.
    pub async fn invalidate(&self, key: QueryKey) {
        let mut state = self.inner.write().await;
        state.generation += 1;
        match key {
            QueryKey::Shelters => {
                if let Some(entry) = state.list.as_mut() {
                    entry.stale = true;
                }
            }
            QueryKey::Shelter(id) => {
                if let Some(entry) = state.items.get_mut(&id) {
                    entry.stale = true;
                }
            }
        }
        debug!(?key, "cache invalidated");
    }

    /// Drop the cached copy of a deleted shelter.
    pub async fn forget(&self, id: u64) {
        let mut state = self.inner.write().await;
        state.generation += 1;
        state.items.remove(&id);
        debug!(id, "cache entry dropped");
    }

    /// Number of shelters cached individually.
    pub async fn item_count(&self) -> usize {
        self.inner.read().await.items.len()
    }

    /// True when the next read of `key` would hit the backend.
    pub async fn is_stale(&self, key: QueryKey) -> bool {
        let state = self.inner.read().await;
        match key {
            QueryKey::Shelters => state.list.as_ref().is_none_or(|e| e.stale),
            QueryKey::Shelter(id) => state.items.get(&id).is_none_or(|e| e.stale),
        }
    }

    /// Last cached collection, fresh or stale, without fetching.
    pub async fn peek_shelters(&self) -> Option<Vec<Shelter>> {
        self.inner.read().await.list.as_ref().map(|e| e.value.clone())
    }
}

#[cfg(test)]
#[path = "cache_test.rs"]
mod tests;
