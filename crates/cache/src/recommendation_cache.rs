//! Typed cache front for the recommendation service.

use std::sync::Arc;
use std::time::Duration;

use listings::{Property, PropertyId, SearchQuery};
use parking_lot::Mutex;
use personalization::UserPreference;
use scoring::SimilarityScore;
use tracing::{debug, info, warn};

use crate::config::CacheConfig;
use crate::keys;
use crate::store::{CacheStats, TtlCache};
use crate::sweeper::{SweepHandle, spawn_sweeper};

/// Ranked similar properties for one source property
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarResultSet {
    pub properties: Vec<Arc<Property>>,
    pub scores: Vec<SimilarityScore>,
    /// Limit the set was scored with; it holds at most this many entries
    pub limit: usize,
    /// Merged candidates the set was scored from
    pub total_candidates: usize,
}

impl SimilarResultSet {
    /// Whether a request for `limit` results can be answered from this set
    pub fn covers(&self, limit: usize) -> bool {
        limit <= self.limit
    }
}

/// Payloads stored in the shared store
#[derive(Debug, Clone)]
pub enum CachedValue {
    Property(Arc<Property>),
    Similar(Arc<SimilarResultSet>),
    Preferences(Arc<UserPreference>),
    Search(Arc<Vec<Arc<Property>>>),
}

pub struct RecommendationCache {
    store: Arc<TtlCache<CachedValue>>,
    config: CacheConfig,
    sweeper: Mutex<Option<SweepHandle>>,
}

impl RecommendationCache {
    /// Build the cache; the expiry sweeper starts when a tokio runtime is available
    pub fn new(config: CacheConfig) -> Self {
        let store = Arc::new(TtlCache::new(config.max_size, config.default_ttl()));
        let cache = Self {
            store,
            config,
            sweeper: Mutex::new(None),
        };
        if !cache.start_sweeper() {
            warn!("No tokio runtime, cache sweeper not started; expired entries are only dropped on read");
        }
        cache
    }

    /// Start the expiry sweeper if it is not already running.
    ///
    /// Returns false when called outside a tokio runtime.
    pub fn start_sweeper(&self) -> bool {
        let mut sweeper = self.sweeper.lock();
        if sweeper.as_ref().is_some_and(SweepHandle::is_running) {
            return true;
        }
        if tokio::runtime::Handle::try_current().is_err() {
            return false;
        }
        *sweeper = Some(spawn_sweeper(&self.store, self.config.sweep_interval()));
        debug!("Cache sweeper started");
        true
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn sweeper_running(&self) -> bool {
        self.sweeper.lock().as_ref().is_some_and(SweepHandle::is_running)
    }

    /// Stop the background sweep; cached entries stay readable
    pub fn shutdown(&self) {
        if let Some(mut handle) = self.sweeper.lock().take() {
            handle.stop();
            info!("Recommendation cache shut down");
        }
    }

    // ---------------------------------------------------------------------
    // Typed accessors
    // ---------------------------------------------------------------------

    pub fn get_property(&self, slug: &str) -> Option<Arc<Property>> {
        match self.store.get(&keys::property_key(slug))? {
            CachedValue::Property(property) => Some(property),
            _ => None,
        }
    }

    pub fn set_property(&self, property: Arc<Property>) {
        let key = keys::property_key(&property.slug);
        self.store
            .set(key, CachedValue::Property(property), Some(self.config.property_ttl()));
    }

    pub fn get_similar(&self, property_id: PropertyId) -> Option<Arc<SimilarResultSet>> {
        match self.store.get(&keys::similar_key(property_id))? {
            CachedValue::Similar(result) => Some(result),
            _ => None,
        }
    }

    pub fn set_similar(&self, property_id: PropertyId, result: SimilarResultSet) {
        self.store.set(
            keys::similar_key(property_id),
            CachedValue::Similar(Arc::new(result)),
            Some(self.config.similar_ttl()),
        );
    }

    pub fn get_preferences(&self, user_id: &str) -> Option<Arc<UserPreference>> {
        match self.store.get(&keys::preferences_key(user_id))? {
            CachedValue::Preferences(prefs) => Some(prefs),
            _ => None,
        }
    }

    pub fn set_preferences(&self, user_id: &str, preferences: UserPreference) {
        self.store.set(
            keys::preferences_key(user_id),
            CachedValue::Preferences(Arc::new(preferences)),
            Some(self.config.preferences_ttl()),
        );
    }

    pub fn remove_preferences(&self, user_id: &str) -> bool {
        self.store.delete(&keys::preferences_key(user_id))
    }

    pub fn get_search(&self, query: &SearchQuery) -> Option<Arc<Vec<Arc<Property>>>> {
        match self.store.get(&keys::search_key(query))? {
            CachedValue::Search(results) => Some(results),
            _ => None,
        }
    }

    pub fn set_search(&self, query: &SearchQuery, results: Vec<Arc<Property>>) {
        self.store.set(
            keys::search_key(query),
            CachedValue::Search(Arc::new(results)),
            Some(self.config.search_ttl()),
        );
    }

    // ---------------------------------------------------------------------
    // Raw access and maintenance
    // ---------------------------------------------------------------------

    pub fn get(&self, key: &str) -> Option<CachedValue> {
        self.store.get(key)
    }

    pub fn set(&self, key: impl Into<String>, value: CachedValue, ttl: Option<Duration>) {
        self.store.set(key, value, ttl);
    }

    pub fn delete(&self, key: &str) -> bool {
        self.store.delete(key)
    }

    pub fn clear(&self) {
        self.store.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.store.stats()
    }

    /// Drop the similar-result set of `property_id` and its direct property entry.
    ///
    /// Result sets of other properties that merely contain it are left alone.
    pub fn invalidate_property(&self, property_id: PropertyId) -> usize {
        let similar_key = keys::similar_key(property_id);
        let removed = self.store.remove_matching(|key, value| match value {
            CachedValue::Similar(_) => key == similar_key,
            CachedValue::Property(property) => property.id == property_id,
            _ => false,
        });
        debug!(property_id, removed, "Invalidated cache entries");
        removed
    }
}

impl Drop for RecommendationCache {
    fn drop(&mut self) {
        self.shutdown();
    }
}
