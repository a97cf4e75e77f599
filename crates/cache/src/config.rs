use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Capacity, expiry and sweep settings for the recommendation cache.
///
/// Durations are expressed in whole seconds so a JSON config stays readable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub max_size: usize,
    pub default_ttl_secs: u64,
    pub sweep_interval_secs: u64,
    pub property_ttl_secs: u64,
    pub similar_ttl_secs: u64,
    pub preferences_ttl_secs: u64,
    pub search_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: 1000,
            default_ttl_secs: 5 * 60,
            sweep_interval_secs: 5 * 60,
            property_ttl_secs: 30 * 60,
            similar_ttl_secs: 15 * 60,
            preferences_ttl_secs: 60 * 60,
            search_ttl_secs: 10 * 60,
        }
    }
}

impl CacheConfig {
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval_secs = interval.as_secs().max(1);
        self
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }

    pub fn property_ttl(&self) -> Duration {
        Duration::from_secs(self.property_ttl_secs)
    }

    pub fn similar_ttl(&self) -> Duration {
        Duration::from_secs(self.similar_ttl_secs)
    }

    pub fn preferences_ttl(&self) -> Duration {
        Duration::from_secs(self.preferences_ttl_secs)
    }

    pub fn search_ttl(&self) -> Duration {
        Duration::from_secs(self.search_ttl_secs)
    }
}
