//! Bounded cache of loaded adapters.
//!
//! Loading a model is expensive (deserialization, graph optimization), so each
//! artifact reference is loaded at most once while it stays cached. Concurrent
//! requests for the same uncached reference share one load: the first caller
//! runs the loader and the others block on the same slot until it finishes,
//! then all of them receive its outcome, success or failure.

use super::loader::AdapterLoader;
use crate::core::ClassifierError;
use lru::LruCache;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{debug, info};

type LoadOutcome<A> = Result<Arc<A>, Arc<ClassifierError>>;
type LoadSlot<A> = Arc<OnceCell<LoadOutcome<A>>>;

/// LRU cache of adapters keyed by artifact reference.
pub struct AdapterCache<L: AdapterLoader> {
    loader: L,
    entries: Mutex<LruCache<String, Arc<L::Adapter>>>,
    /// In-flight loads, one slot per reference.
    pending: Mutex<HashMap<String, LoadSlot<L::Adapter>>>,
    capacity: NonZeroUsize,
}

impl<L: AdapterLoader> std::fmt::Debug for AdapterCache<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterCache")
            .field("capacity", &self.capacity)
            .field("keys", &self.keys())
            .finish()
    }
}

impl<L: AdapterLoader> AdapterCache<L> {
    /// Creates an empty cache holding at most `capacity` adapters.
    pub fn new(loader: L, capacity: usize) -> Result<Self, ClassifierError> {
        let capacity = NonZeroUsize::new(capacity).ok_or_else(|| {
            ClassifierError::config_error("adapter cache capacity must be at least 1")
        })?;
        Ok(Self {
            loader,
            entries: Mutex::new(LruCache::new(capacity)),
            pending: Mutex::new(HashMap::new()),
            capacity,
        })
    }

    /// Returns the adapter for `reference`, loading it on a miss.
    ///
    /// A hit returns the same `Arc` as every earlier call and promotes the
    /// entry. A failed load is reported to every caller that waited on it but
    /// is not cached; the next call tries again. When several callers share a
    /// failure, all but the last to finish get it as [`ClassifierError::Shared`].
    pub fn get_or_load(&self, reference: &str) -> Result<Arc<L::Adapter>, ClassifierError> {
        if let Some(hit) = self.entries.lock().get(reference) {
            return Ok(Arc::clone(hit));
        }

        let slot = {
            let mut pending = self.pending.lock();
            // A load may have completed between the first lookup and here.
            if let Some(hit) = self.entries.lock().get(reference) {
                return Ok(Arc::clone(hit));
            }
            Arc::clone(pending.entry(reference.to_string()).or_default())
        };

        let outcome = slot
            .get_or_init(|| self.load_and_insert(reference).map_err(Arc::new))
            .clone();

        {
            let mut pending = self.pending.lock();
            if pending
                .get(reference)
                .is_some_and(|current| Arc::ptr_eq(current, &slot))
            {
                pending.remove(reference);
            }
        }
        drop(slot);
        outcome.map_err(ClassifierError::from_shared)
    }

    fn load_and_insert(&self, reference: &str) -> Result<Arc<L::Adapter>, ClassifierError> {
        debug!(model = reference, "adapter cache miss");
        let adapter = Arc::new(self.loader.load(reference)?);

        let mut entries = self.entries.lock();
        let displaced = entries.push(reference.to_string(), Arc::clone(&adapter));
        if let Some((evicted, _)) = displaced.filter(|(key, _)| key != reference) {
            info!(
                evicted = %evicted,
                loaded = reference,
                capacity = self.capacity.get(),
                "evicted least recently used adapter"
            );
        }
        Ok(adapter)
    }

    /// Whether `reference` is cached. Does not change recency.
    pub fn contains(&self, reference: &str) -> bool {
        self.entries.lock().contains(reference)
    }

    /// Number of cached adapters.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Maximum number of cached adapters.
    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    /// Cached references, most recently used first.
    pub fn keys(&self) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Drops every cached adapter. Adapters still held by callers stay alive.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// The loader behind this cache.
    pub fn loader(&self) -> &L {
        &self.loader
    }
}
