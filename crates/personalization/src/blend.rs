//! Preference, behavior and blended scores for a single candidate.

use listings::{Property, normalize_location};
use scoring::factors::{jaccard, sanitise};
use scoring::{ConfigError, round2, validate_weight_set};
use serde::{Deserialize, Serialize};

use crate::types::{PersonalizationFactors, UserBehavior, UserPreference};

/// Used when there is not enough data to judge a sub-check either way
const UNKNOWN_SUB_SCORE: f64 = 0.5;

const VIEWED_WEIGHT: f64 = 0.3;
const FAVORITED_WEIGHT: f64 = 0.4;
const LOCATION_SEARCH_WEIGHT: f64 = 0.2;
const TYPE_SEARCH_WEIGHT: f64 = 0.1;

pub const FALLBACK_REASON: &str = "Similar property";

/// Weights of the three personalized components
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendWeights {
    pub similarity: f64,
    pub preference: f64,
    pub behavior: f64,
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self {
            similarity: 0.40,
            preference: 0.35,
            behavior: 0.25,
        }
    }
}

impl BlendWeights {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_weight_set(
            "blend",
            &[
                ("similarity", self.similarity),
                ("preference", self.preference),
                ("behavior", self.behavior),
            ],
        )
    }

    /// Weighted sum rounded to two decimals
    pub fn blend(&self, factors: &PersonalizationFactors) -> f64 {
        let total = factors.similarity * self.similarity
            + factors.preference * self.preference
            + factors.behavior * self.behavior;
        sanitise(round2(total))
    }
}

fn location_matches(candidate_location: &str, known: &str) -> bool {
    !known.is_empty() && (candidate_location.contains(known) || known.contains(candidate_location))
}

fn indicator(hit: bool) -> f64 {
    if hit { 1.0 } else { 0.0 }
}

/// Average of six sub-checks against the user's accumulated preferences
pub fn preference_score(preference: &UserPreference, candidate: &Property) -> f64 {
    let type_match = indicator(preference.property_types.contains(&candidate.property_type));

    let price_match = match (&preference.price_range, candidate.lowest_price()) {
        (Some(range), Some(_)) => indicator(candidate.has_price_within(range.min, range.max)),
        _ => UNKNOWN_SUB_SCORE,
    };

    let location = normalize_location(&candidate.location);
    let location_match = indicator(
        !location.is_empty()
            && preference
                .locations
                .iter()
                .any(|known| location_matches(&location, known)),
    );

    let amenity_overlap = if preference.amenities.is_empty() {
        0.0
    } else {
        jaccard(&preference.amenities, &candidate.amenities)
    };

    let collection_match = indicator(preference.collections.contains(&candidate.collection));

    let developer_match = indicator(
        candidate
            .developer_id()
            .is_some_and(|id| preference.developer_ids.contains(&id)),
    );

    let checks = [
        type_match,
        price_match,
        location_match,
        amenity_overlap,
        collection_match,
        developer_match,
    ];
    sanitise(checks.iter().sum::<f64>() / checks.len() as f64)
}

/// Weighted presence checks against the user's history.
///
/// Only checks whose history is non-empty count towards the average.
pub fn behavior_score(behavior: &UserBehavior, candidate: &Property) -> f64 {
    let mut total = 0.0;
    let mut evaluated = 0usize;

    if !behavior.viewed.is_empty() {
        evaluated += 1;
        if behavior.viewed.contains(&candidate.id) {
            total += VIEWED_WEIGHT;
        }
    }

    if !behavior.favorited.is_empty() {
        evaluated += 1;
        if behavior.favorited.contains(&candidate.id) {
            total += FAVORITED_WEIGHT;
        }
    }

    if !behavior.searched_locations.is_empty() {
        evaluated += 1;
        let location = normalize_location(&candidate.location);
        if behavior
            .searched_locations
            .iter()
            .any(|searched| location_matches(&location, searched))
        {
            total += LOCATION_SEARCH_WEIGHT;
        }
    }

    if !behavior.searched_types.is_empty() {
        evaluated += 1;
        if behavior.searched_types.contains(&candidate.property_type) {
            total += TYPE_SEARCH_WEIGHT;
        }
    }

    if evaluated == 0 {
        return 0.0;
    }
    sanitise(total / evaluated as f64)
}

/// Human readable explanation of a personalized score
pub fn reason_for(factors: &PersonalizationFactors) -> String {
    let mut parts = Vec::new();

    if factors.similarity > 0.7 {
        parts.push("Very similar property");
    } else if factors.similarity > 0.5 {
        parts.push("Similar property");
    }

    if factors.preference > 0.7 {
        parts.push("Matches your preferences");
    } else if factors.preference > 0.5 {
        parts.push("Partially matches your preferences");
    }

    if factors.behavior > 0.7 {
        parts.push("Based on your activity");
    } else if factors.behavior > 0.5 {
        parts.push("Related to your recent activity");
    }

    if parts.is_empty() {
        FALLBACK_REASON.to_string()
    } else {
        parts.join(", ")
    }
}
