use std::sync::Arc;

use shared::error::ResourceError;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::resource::{Resource, ResourceClient};

/// Case-insensitive predicate deciding whether an entity matches a search
/// term. The term arrives trimmed and lowercased.
pub type SearchMatcher<R> = Box<dyn Fn(&R, &str) -> bool + Send + Sync>;

/// In-memory mirror of one remote collection plus the visible slice the
/// current search term selects. Stale load completions are discarded by
/// sequence number, so a slow early response never clobbers a newer one.
pub struct EntityCache<R: Resource> {
    client: Arc<dyn ResourceClient<R>>,
    matcher: SearchMatcher<R>,
    inner: Mutex<CacheState<R>>,
}

struct CacheState<R> {
    all: Vec<R>,
    visible: Vec<R>,
    term: String,
    issued: u64,
    completed: u64,
}

impl<R: Resource> EntityCache<R> {
    pub fn new(client: Arc<dyn ResourceClient<R>>, matcher: SearchMatcher<R>) -> Self {
        Self {
            client,
            matcher,
            inner: Mutex::new(CacheState {
                all: Vec::new(),
                visible: Vec::new(),
                term: String::new(),
                issued: 0,
                completed: 0,
            }),
        }
    }

    /// Refreshes from the remote store. On failure the previous contents
    /// stay; the caller decides how to surface the error.
    pub async fn load(&self) -> Result<(), ResourceError> {
        let sequence = {
            let mut state = self.inner.lock().await;
            state.issued += 1;
            state.issued
        };

        let outcome = self.client.list().await;

        let mut state = self.inner.lock().await;
        if sequence <= state.completed {
            debug!(
                resource = R::PATH,
                sequence,
                newest = state.completed,
                "cache: discarding stale load"
            );
            return Ok(());
        }
        state.completed = sequence;
        match outcome {
            Ok(entities) => {
                debug!(resource = R::PATH, count = entities.len(), "cache: loaded");
                state.all = entities;
                refilter_state(&mut state, &self.matcher);
                Ok(())
            }
            Err(err) => {
                warn!(resource = R::PATH, error = %err, "cache: load failed");
                Err(err)
            }
        }
    }

    /// Recomputes the visible slice for a new search term. Purely local.
    pub async fn set_search_term(&self, term: &str) {
        let mut state = self.inner.lock().await;
        state.term = term.trim().to_lowercase();
        refilter_state(&mut state, &self.matcher);
    }

    /// Re-applies the current term, for callers that changed the data the
    /// matcher consults outside the cache.
    pub async fn refilter(&self) {
        let mut state = self.inner.lock().await;
        refilter_state(&mut state, &self.matcher);
    }

    pub async fn search_term(&self) -> String {
        self.inner.lock().await.term.clone()
    }

    pub async fn visible(&self) -> Vec<R> {
        self.inner.lock().await.visible.clone()
    }

    pub async fn all(&self) -> Vec<R> {
        self.inner.lock().await.all.clone()
    }

    pub async fn find_by_id(&self, id: R::Id) -> Option<R> {
        self.inner
            .lock()
            .await
            .all
            .iter()
            .find(|entity| entity.id() == id)
            .cloned()
    }
}

fn refilter_state<R: Resource>(state: &mut CacheState<R>, matcher: &SearchMatcher<R>) {
    if state.term.is_empty() {
        state.visible = state.all.clone();
    } else {
        state.visible = state
            .all
            .iter()
            .filter(|entity| matcher(entity, &state.term))
            .cloned()
            .collect();
    }
}

#[cfg(test)]
#[path = "tests/cache_tests.rs"]
mod tests;
