//! Cached deck corpus with periodic invalidation.
//!
//! Readers get an `Arc<Corpus>` snapshot and never hold a lock while they
//! aggregate. Invalidation drops the current snapshot; the next reader
//! reloads it. Reloads are serialized so concurrent readers on a cold cache
//! trigger a single load.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, info};

use super::{filter_decks, Corpus, CorpusDeck, DeckFilter, DeckSource, DecksRequest, StorageError};

/// How long a loaded corpus stays valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Dropped on a fixed interval by a background task
    Periodic(Duration),
    /// Kept until explicitly invalidated
    Snapshot,
}

#[derive(Debug, Default)]
struct CacheState {
    corpus: Option<Arc<Corpus>>,
    version: u64,
}

/// Owns the authoritative in-memory deck corpus.
pub struct DeckStore {
    source: Box<dyn DeckSource>,
    policy: CachePolicy,
    strict_queries: bool,
    state: RwLock<CacheState>,
    reload: Mutex<()>,
}

impl DeckStore {
    pub fn new(source: Box<dyn DeckSource>, policy: CachePolicy) -> Self {
        Self {
            source,
            policy,
            strict_queries: false,
            state: RwLock::new(CacheState::default()),
            reload: Mutex::new(()),
        }
    }

    /// Reject queries with unsupported terms instead of ignoring those terms.
    pub fn with_strict_queries(mut self, strict: bool) -> Self {
        self.strict_queries = strict;
        self
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    fn cached(&self) -> Option<Arc<Corpus>> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .corpus
            .clone()
    }

    fn reload_guard(&self) -> MutexGuard<'_, ()> {
        self.reload.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The current corpus, loading it if the cache is cold.
    pub fn snapshot(&self) -> Result<Arc<Corpus>, StorageError> {
        if let Some(corpus) = self.cached() {
            return Ok(corpus);
        }

        let _guard = self.reload_guard();
        // Another reader may have finished loading while we waited.
        if let Some(corpus) = self.cached() {
            return Ok(corpus);
        }

        let decks = self.source.load()?;
        let version = self.version() + 1;
        let corpus = Arc::new(Corpus::build(decks, version));

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.version = version;
        state.corpus = Some(Arc::clone(&corpus));
        info!("Deck corpus v{} ready with {} decks", version, corpus.len());
        Ok(corpus)
    }

    /// Decks matching the request, in load order.
    pub fn list(&self, request: &DecksRequest) -> Result<Vec<Arc<CorpusDeck>>, StorageError> {
        self.list_snapshot(request).map(|(_, decks)| decks)
    }

    /// Matching decks together with the corpus they were taken from.
    pub fn list_snapshot(
        &self,
        request: &DecksRequest,
    ) -> Result<(Arc<Corpus>, Vec<Arc<CorpusDeck>>), StorageError> {
        let filter = DeckFilter::new(request, self.strict_queries)?;
        let corpus = self.snapshot()?;
        let decks = filter_decks(corpus.decks(), &filter);
        Ok((corpus, decks))
    }

    /// Drop the cached corpus so the next read reloads it.
    pub fn invalidate(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.corpus.take().is_some() {
            debug!("Deck corpus v{} invalidated", state.version);
        }
    }

    /// Version of the most recent load; 0 before the first.
    pub fn version(&self) -> u64 {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .version
    }

    /// Invalidate the cache every `every` until the task is aborted.
    pub async fn run_periodic_invalidation(self: Arc<Self>, every: Duration) {
        let mut ticker = interval(every);
        // The first tick completes immediately.
        ticker.tick().await;

        info!("Invalidating deck cache every {:?}", every);
        loop {
            ticker.tick().await;
            self.invalidate();
        }
    }

    /// Start background invalidation if the policy calls for it.
    pub fn spawn_invalidation(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        match self.policy {
            CachePolicy::Periodic(every) => {
                Some(tokio::spawn(Arc::clone(self).run_periodic_invalidation(every)))
            }
            CachePolicy::Snapshot => None,
        }
    }
}
