//! In-process query cache.
//!
//! Entries live in a mutex-guarded map. Every change is announced on a
//! broadcast channel after the lock is released; slow subscribers may lag
//! and should re-read the keys they render.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;

use crate::domain::ports::{
    CacheEvent, CacheEventKind, QueryCache, QueryCacheError, QueryData, QueryKey,
};

const EVENT_CAPACITY: usize = 64;

/// Query cache held in memory for the lifetime of the process.
#[derive(Debug)]
pub struct InMemoryQueryCache {
    entries: Mutex<HashMap<QueryKey, QueryData>>,
    events: broadcast::Sender<CacheEvent>,
}

impl Default for InMemoryQueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryQueryCache {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            entries: Mutex::new(HashMap::new()),
            events,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<QueryKey, QueryData>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn announce(&self, key: Option<QueryKey>, kind: CacheEventKind) {
        // Sending fails only when nobody is subscribed.
        let _ = self.events.send(CacheEvent { key, kind });
    }
}

fn shape_mismatch(key: &QueryKey) -> QueryCacheError {
    QueryCacheError::shape_mismatch(key.label())
}

impl QueryCache for InMemoryQueryCache {
    fn read(&self, key: &QueryKey) -> Option<QueryData> {
        self.lock().get(key).cloned()
    }

    fn write(&self, key: QueryKey, data: QueryData) -> Result<(), QueryCacheError> {
        if !key.accepts(&data) {
            return Err(shape_mismatch(&key));
        }
        self.lock().insert(key.clone(), data);
        self.announce(Some(key), CacheEventKind::Written);
        Ok(())
    }

    fn update(
        &self,
        key: &QueryKey,
        modify: &mut dyn FnMut(&mut QueryData) -> bool,
    ) -> Result<bool, QueryCacheError> {
        let mut entries = self.lock();
        let Some(current) = entries.get(key) else {
            return Ok(false);
        };
        let mut candidate = current.clone();
        if !modify(&mut candidate) {
            return Ok(false);
        }
        if !key.accepts(&candidate) {
            return Err(shape_mismatch(key));
        }
        entries.insert(key.clone(), candidate);
        drop(entries);
        self.announce(Some(key.clone()), CacheEventKind::Written);
        Ok(true)
    }

    fn keys(&self) -> Vec<QueryKey> {
        self.lock().keys().cloned().collect()
    }

    fn evict(&self, key: &QueryKey) -> bool {
        let removed = self.lock().remove(key).is_some();
        if removed {
            self.announce(Some(key.clone()), CacheEventKind::Evicted);
        }
        removed
    }

    fn clear(&self) {
        self.lock().clear();
        self.announce(None, CacheEventKind::Cleared);
    }

    fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }
}
