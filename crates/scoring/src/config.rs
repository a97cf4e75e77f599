//! Validated configuration for the similarity engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tolerance when checking that a weight set sums to 1.0
pub const WEIGHT_SUM_EPSILON: f64 = 1e-6;

/// Errors raised when a configuration is rejected
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{set} weights must sum to 1.0, got {sum:.6}")]
    WeightsDoNotSumToOne { set: &'static str, sum: f64 },

    #[error("weight '{name}' must be within [0, 1], got {value}")]
    WeightOutOfRange { name: &'static str, value: f64 },

    #[error("parameter '{name}' must be strictly positive, got {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}

/// Check a named weight set: every weight in [0, 1] and a total of 1.0
pub fn validate_weight_set(
    set: &'static str,
    weights: &[(&'static str, f64)],
) -> Result<(), ConfigError> {
    for &(name, value) in weights {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(ConfigError::WeightOutOfRange { name, value });
        }
    }

    let sum: f64 = weights.iter().map(|(_, w)| w).sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_EPSILON {
        return Err(ConfigError::WeightsDoNotSumToOne { set, sum });
    }
    Ok(())
}

fn require_positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter { name, value })
    }
}

/// Per-factor weights of the aggregate similarity score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityWeights {
    pub location: f64,
    pub property_type: f64,
    pub price: f64,
    pub size: f64,
    pub amenities: f64,
    pub collection: f64,
    pub developer: f64,
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        Self {
            location: 0.25,
            property_type: 0.20,
            price: 0.20,
            size: 0.15,
            amenities: 0.10,
            collection: 0.05,
            developer: 0.05,
        }
    }
}

impl SimilarityWeights {
    fn named(&self) -> [(&'static str, f64); 7] {
        [
            ("location", self.location),
            ("property_type", self.property_type),
            ("price", self.price),
            ("size", self.size),
            ("amenities", self.amenities),
            ("collection", self.collection),
            ("developer", self.developer),
        ]
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_weight_set("similarity", &self.named())
    }
}

/// Tuning knobs of the similarity engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    pub weights: SimilarityWeights,
    /// Candidates further than this score 0 on location
    pub max_distance_km: f64,
    /// Scale of the exponential distance decay
    pub distance_decay_km: f64,
    /// Relative price difference at which the price factor reaches 0
    pub price_tolerance: f64,
    /// Relative area difference at which the size factor reaches 0
    pub size_tolerance: f64,
    /// Candidates scoring at or below this are dropped
    pub min_score: f64,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            weights: SimilarityWeights::default(),
            max_distance_km: 10.0,
            distance_decay_km: 5.0,
            price_tolerance: 0.30,
            size_tolerance: 0.40,
            min_score: 0.3,
        }
    }
}

impl SimilarityConfig {
    pub fn with_weights(mut self, weights: SimilarityWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_max_distance_km(mut self, km: f64) -> Self {
        self.max_distance_km = km;
        self
    }

    pub fn with_price_tolerance(mut self, tolerance: f64) -> Self {
        self.price_tolerance = tolerance;
        self
    }

    pub fn with_size_tolerance(mut self, tolerance: f64) -> Self {
        self.size_tolerance = tolerance;
        self
    }

    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = min_score;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;
        require_positive("max_distance_km", self.max_distance_km)?;
        require_positive("distance_decay_km", self.distance_decay_km)?;
        require_positive("price_tolerance", self.price_tolerance)?;
        require_positive("size_tolerance", self.size_tolerance)?;
        if !(0.0..1.0).contains(&self.min_score) {
            return Err(ConfigError::InvalidParameter {
                name: "min_score",
                value: self.min_score,
            });
        }
        Ok(())
    }
}
