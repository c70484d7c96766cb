//! In-memory lookup cache keyed by normalized input text.
//!
//! The cache is an explicit collaborator injected into the resolver rather
//! than hidden module state, so its lifecycle (bounds, expiry, reset) is
//! visible and testable. At most one entry exists per normalized key.
//! Entries never expire unless a TTL is configured; when the cache is full,
//! the oldest entry is evicted first.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::config::CacheConfig;
use crate::models::LookupOutcome;

/// Normalize free text into a cache key: lowercase, trimmed, internal
/// whitespace collapsed to single spaces.
pub fn normalize_key(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

struct Entry {
    outcome: LookupOutcome,
    inserted_at: Instant,
}

/// Snapshot of cache occupancy for the introspection surfaces.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
    pub ttl_secs: Option<u64>,
}

pub struct LookupCache {
    max_entries: usize,
    ttl: Option<Duration>,
    inner: Mutex<HashMap<String, Entry>>,
}

impl LookupCache {
    pub fn new(max_entries: usize, ttl: Option<Duration>) -> Self {
        Self {
            max_entries: max_entries.max(1),
            ttl,
            inner: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(
            config.max_entries,
            config.ttl_secs.map(Duration::from_secs),
        )
    }

    /// Look up a previously cached outcome. Expired entries are dropped on
    /// read and reported as misses.
    pub fn get(&self, text: &str) -> Option<LookupOutcome> {
        let key = normalize_key(text);
        let mut map = self.lock();

        if let Some(ttl) = self.ttl {
            if map.get(&key).is_some_and(|e| e.inserted_at.elapsed() > ttl) {
                map.remove(&key);
                return None;
            }
        }

        map.get(&key).map(|e| e.outcome.clone())
    }

    /// Store an outcome under the normalized key, evicting the oldest entry
    /// if the cache is at capacity.
    pub fn insert(&self, text: &str, outcome: LookupOutcome) {
        let key = normalize_key(text);
        let mut map = self.lock();

        if !map.contains_key(&key) && map.len() >= self.max_entries {
            let oldest = map
                .iter()
                .min_by_key(|(_, e)| e.inserted_at)
                .map(|(k, _)| k.clone());
            if let Some(k) = oldest {
                map.remove(&k);
            }
        }

        map.insert(
            key,
            Entry {
                outcome,
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Count of live (non-expired) entries.
    pub fn len(&self) -> usize {
        let mut map = self.lock();
        if let Some(ttl) = self.ttl {
            map.retain(|_, e| e.inserted_at.elapsed() <= ttl);
        }
        map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            capacity: self.max_entries,
            ttl_secs: self.ttl.map(|t| t.as_secs()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        // A poisoned lock only means another thread panicked mid-operation;
        // the map itself is still usable.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
