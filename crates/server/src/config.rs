//! Service-wide configuration.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use cache::CacheConfig;
use personalization::BlendWeights;
use scoring::SimilarityConfig;
use serde::{Deserialize, Serialize};
use sources::RetrievalConfig;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceConfigError {
    #[error("{name} must be greater than zero")]
    NotPositive { name: &'static str },
}

/// Everything the recommendation service can be tuned with.
///
/// A JSON file only needs the fields it overrides:
/// ```json
/// { "similarity": { "max_distance_km": 15.0 }, "cache": { "max_size": 5000 } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub similarity: SimilarityConfig,
    pub blend: BlendWeights,
    pub cache: CacheConfig,
    pub retrieval: RetrievalConfig,
    /// Recommendations returned when the caller does not ask for a count
    pub default_limit: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            similarity: SimilarityConfig::default(),
            blend: BlendWeights::default(),
            cache: CacheConfig::default(),
            retrieval: RetrievalConfig::default(),
            default_limit: 6,
        }
    }
}

impl ServiceConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: ServiceConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        config.validate()?;
        info!("Loaded service configuration from {:?}", path);
        Ok(config)
    }

    /// Fail fast on any weight set or parameter the service cannot run with
    pub fn validate(&self) -> Result<()> {
        self.similarity.validate().context("Invalid similarity configuration")?;
        self.blend.validate().context("Invalid personalization weights")?;

        let positive = [
            ("cache.max_size", self.cache.max_size),
            ("retrieval.candidate_multiplier", self.retrieval.candidate_multiplier),
            ("default_limit", self.default_limit),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(ServiceConfigError::NotPositive { name }.into());
            }
        }
        if !(self.retrieval.price_band.is_finite() && self.retrieval.price_band > 0.0) {
            return Err(ServiceConfigError::NotPositive {
                name: "retrieval.price_band",
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(ServiceConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_overrides_only_named_fields() {
        let config: ServiceConfig = serde_json::from_str(
            r#"{ "similarity": { "min_score": 0.5 }, "cache": { "max_size": 10 }, "default_limit": 3 }"#,
        )
        .unwrap();

        assert_eq!(config.similarity.min_score, 0.5);
        assert_eq!(config.similarity.max_distance_km, 10.0);
        assert_eq!(config.cache.max_size, 10);
        assert_eq!(config.cache.similar_ttl_secs, 15 * 60);
        assert_eq!(config.blend, BlendWeights::default());
        assert_eq!(config.default_limit, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_weights_fail_validation() {
        let config: ServiceConfig =
            serde_json::from_str(r#"{ "blend": { "similarity": 0.9 } }"#).unwrap();
        let err = config.validate().unwrap_err();
        assert!(format!("{:#}", err).contains("blend weights must sum to 1.0"));
    }

    #[test]
    fn test_zero_limit_rejected() {
        let config = ServiceConfig {
            default_limit: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
