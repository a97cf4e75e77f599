//! Generic TTL store with least-recently-accessed eviction.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use serde::Serialize;
use tracing::debug;

/// A cached payload plus its expiry and access metadata
#[derive(Debug, Clone)]
pub struct CacheItem<V> {
    value: V,
    created_at: Instant,
    ttl: Duration,
    access_count: u64,
    last_accessed: Instant,
    /// Logical clock of the last access; orders entries for LRU eviction
    access_seq: u64,
}

impl<V> CacheItem<V> {
    fn new(value: V, ttl: Duration, seq: u64) -> Self {
        let now = Instant::now();
        Self {
            value,
            created_at: now,
            ttl,
            access_count: 0,
            last_accessed: now,
            access_seq: seq,
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.created_at) > self.ttl
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn access_count(&self) -> u64 {
        self.access_count
    }

    pub fn last_accessed(&self) -> Instant {
        self.last_accessed
    }
}

/// Snapshot of cache effectiveness
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
    /// hits / (hits + misses), 0 before the first lookup
    pub hit_rate: f64,
}

struct Inner<V> {
    entries: HashMap<String, CacheItem<V>>,
    hits: u64,
    misses: u64,
    clock: u64,
}

impl<V> Inner<V> {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn evict_least_recent(&mut self) -> Option<String> {
        let victim = self
            .entries
            .iter()
            .min_by_key(|(_, item)| item.access_seq)
            .map(|(key, _)| key.clone())?;
        self.entries.remove(&victim);
        Some(victim)
    }
}

/// Capacity-bounded key/value store with per-entry TTL.
///
/// Values are handed out by clone, so payloads are normally `Arc`s.
pub struct TtlCache<V> {
    inner: Mutex<Inner<V>>,
    max_size: usize,
    default_ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(max_size: usize, default_ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                hits: 0,
                misses: 0,
                clock: 0,
            }),
            max_size: max_size.max(1),
            default_ttl,
        }
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Look up `key`, dropping it if it has expired
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let mut inner = self.inner.lock();

        match inner.entries.get(key).map(|item| item.is_expired(now)) {
            None => {
                inner.misses += 1;
                return None;
            }
            Some(true) => {
                inner.entries.remove(key);
                inner.misses += 1;
                debug!(key, "Cache entry expired on read");
                return None;
            }
            Some(false) => {}
        }

        let seq = inner.tick();
        inner.hits += 1;
        let item = inner.entries.get_mut(key)?;
        item.access_count += 1;
        item.last_accessed = now;
        item.access_seq = seq;
        Some(item.value.clone())
    }

    /// Store `value` under `key`; `ttl` falls back to the store default.
    ///
    /// A new key arriving at a full store evicts the least recently
    /// accessed entry first.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        let key = key.into();
        let ttl = ttl.unwrap_or(self.default_ttl);
        let mut inner = self.inner.lock();

        if !inner.entries.contains_key(&key)
            && inner.entries.len() >= self.max_size
            && let Some(evicted) = inner.evict_least_recent()
        {
            debug!(key = %evicted, "Evicted least recently used cache entry");
        }

        let seq = inner.tick();
        inner.entries.insert(key, CacheItem::new(value, ttl, seq));
    }

    /// Remove `key`; true if it was present
    pub fn delete(&self, key: &str) -> bool {
        self.inner.lock().entries.remove(key).is_some()
    }

    /// Drop every entry and reset the hit/miss counters
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.hits = 0;
        inner.misses = 0;
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `key` holds a live entry; does not touch stats or recency
    pub fn contains_key(&self, key: &str) -> bool {
        let now = Instant::now();
        self.inner
            .lock()
            .entries
            .get(key)
            .is_some_and(|item| !item.is_expired(now))
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        let lookups = inner.hits + inner.misses;
        CacheStats {
            hits: inner.hits,
            misses: inner.misses,
            size: inner.entries.len(),
            hit_rate: if lookups == 0 {
                0.0
            } else {
                inner.hits as f64 / lookups as f64
            },
        }
    }

    /// Remove every expired entry, returning how many were dropped
    pub fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let mut inner = self.inner.lock();
        let before = inner.entries.len();
        inner.entries.retain(|_, item| !item.is_expired(now));
        before - inner.entries.len()
    }

    /// Remove every entry for which `predicate(key, value)` holds
    pub fn remove_matching<F>(&self, mut predicate: F) -> usize
    where
        F: FnMut(&str, &V) -> bool,
    {
        let mut inner = self.inner.lock();
        let before = inner.entries.len();
        inner.entries.retain(|key, item| !predicate(key, &item.value));
        before - inner.entries.len()
    }

    /// Copy of the entry metadata for `key`, without counting as an access
    pub fn peek_item(&self, key: &str) -> Option<CacheItem<V>> {
        self.inner.lock().entries.get(key).cloned()
    }
}
