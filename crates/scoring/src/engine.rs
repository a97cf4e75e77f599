//! Multi-factor similarity between two property records.
//!
//! The engine is a pure function of its inputs and configuration:
//! identical inputs always produce bit-identical scores.

use std::cmp::Ordering;
use std::sync::Arc;

use listings::{Property, PropertyId};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::config::{ConfigError, SimilarityConfig};
use crate::factors;

/// Per-factor sub-scores behind an aggregate similarity
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FactorScores {
    pub location: f64,
    pub property_type: f64,
    pub price: f64,
    pub size: f64,
    pub amenities: f64,
    pub collection: f64,
    pub developer: f64,
}

impl FactorScores {
    fn as_array(&self) -> [f64; 7] {
        [
            self.location,
            self.property_type,
            self.price,
            self.size,
            self.amenities,
            self.collection,
            self.developer,
        ]
    }

    /// Whether every factor lies in `[0, 1]`
    pub fn in_unit_range(&self) -> bool {
        self.as_array().iter().all(|f| (0.0..=1.0).contains(f))
    }
}

/// Similarity of one candidate to the property being viewed.
///
/// Read-only once computed; the factors are kept for explainability.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityScore {
    property_id: PropertyId,
    score: f64,
    factors: FactorScores,
}

impl SimilarityScore {
    /// Assemble a score from already computed parts
    pub fn from_parts(property_id: PropertyId, score: f64, factors: FactorScores) -> Self {
        Self {
            property_id,
            score: factors::sanitise(score),
            factors,
        }
    }

    pub fn property_id(&self) -> PropertyId {
        self.property_id
    }

    /// Aggregate score in `[0, 1]`, rounded to two decimals
    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn factors(&self) -> &FactorScores {
        &self.factors
    }
}

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Descending by score, ascending by id on ties
pub fn rank_order(a_score: f64, a_id: PropertyId, b_score: f64, b_id: PropertyId) -> Ordering {
    b_score
        .partial_cmp(&a_score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a_id.cmp(&b_id))
}

/// Scores candidate properties against the one being viewed
#[derive(Debug, Clone, Default)]
pub struct SimilarityEngine {
    config: SimilarityConfig,
}

impl SimilarityEngine {
    /// Create an engine, rejecting invalid weight or tolerance settings
    pub fn new(config: SimilarityConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SimilarityConfig {
        &self.config
    }

    /// Score `candidate` against `current`
    pub fn calculate_similarity(&self, current: &Property, candidate: &Property) -> SimilarityScore {
        let config = &self.config;
        let factors = FactorScores {
            location: factors::location_score(current, candidate, config),
            property_type: factors::type_score(current.property_type, candidate.property_type),
            price: factors::price_score(current, candidate, config),
            size: factors::size_score(current, candidate, config),
            amenities: factors::amenity_score(current, candidate),
            collection: factors::collection_score(current.collection, candidate.collection),
            developer: factors::developer_score(current, candidate),
        };

        let weights = &config.weights;
        let total = factors.location * weights.location
            + factors.property_type * weights.property_type
            + factors.price * weights.price
            + factors.size * weights.size
            + factors.amenities * weights.amenities
            + factors.collection * weights.collection
            + factors.developer * weights.developer;

        SimilarityScore::from_parts(candidate.id, round2(total), factors)
    }

    /// Rank `candidates` by similarity to `current`.
    ///
    /// The current property is never returned, scores at or below the
    /// configured minimum are dropped, and at most `limit` scores come back.
    #[instrument(skip(self, current, candidates), fields(property_id = current.id, candidates = candidates.len()))]
    pub fn find_similar_properties(
        &self,
        current: &Property,
        candidates: &[Arc<Property>],
        limit: usize,
    ) -> Vec<SimilarityScore> {
        let mut scores: Vec<SimilarityScore> = candidates
            .par_iter()
            .filter(|candidate| candidate.id != current.id)
            .map(|candidate| self.calculate_similarity(current, candidate))
            .filter(|score| score.score > self.config.min_score)
            .collect();

        scores.sort_by(|a, b| rank_order(a.score, a.property_id, b.score, b.property_id));
        scores.truncate(limit);

        debug!("Kept {} similar properties", scores.len());
        scores
    }
}
