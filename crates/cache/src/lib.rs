//! In-memory caching for the recommendation engine.
//!
//! This crate provides:
//! - `TtlCache<V>`: a capacity-bounded key/value store with per-entry TTL,
//!   least-recently-accessed eviction and hit/miss statistics
//! - `SweepHandle`: a cancellable background task that purges expired entries
//! - `RecommendationCache`: typed accessors with deterministic keys and
//!   per-domain TTLs for properties, similar-result sets, preferences and searches
//!
//! All state sits behind a single mutex; the store is safe to share across
//! tokio tasks and rayon workers.

pub mod config;
pub mod store;
pub mod sweeper;
pub mod keys;
pub mod recommendation_cache;

// Re-export main types
pub use config::CacheConfig;
pub use recommendation_cache::{CachedValue, RecommendationCache, SimilarResultSet};
pub use store::{CacheItem, CacheStats, TtlCache};
pub use sweeper::{SweepHandle, spawn_sweeper};
