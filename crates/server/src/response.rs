//! Caller-facing result of a similar-properties request.

use std::fmt;
use std::sync::Arc;

use cache::CacheStats;
use listings::Property;
use personalization::PersonalizedRecommendation;
use scoring::SimilarityScore;
use serde::Serialize;

/// How a response was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Cached,
    Similarity,
    Fallback,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Cached => "cached",
            Algorithm::Similarity => "similarity",
            Algorithm::Fallback => "fallback",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub total_candidates: usize,
    /// Wall-clock milliseconds
    pub processing_time: f64,
    pub cache_stats: CacheStats,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarPropertiesResponse {
    /// Ranked properties, aligned with `scores`
    pub properties: Vec<Arc<Property>>,
    pub scores: Vec<SimilarityScore>,
    /// Empty when no user id was given
    pub personalized_scores: Vec<PersonalizedRecommendation>,
    pub cache_hit: bool,
    pub algorithm: Algorithm,
    pub metadata: ResponseMetadata,
}

impl SimilarPropertiesResponse {
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape() {
        let response = SimilarPropertiesResponse {
            properties: vec![],
            scores: vec![],
            personalized_scores: vec![],
            cache_hit: false,
            algorithm: Algorithm::Fallback,
            metadata: ResponseMetadata {
                total_candidates: 0,
                processing_time: 1.5,
                cache_stats: CacheStats::default(),
            },
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["algorithm"], "fallback");
        assert_eq!(json["cacheHit"], false);
        assert!(json["personalizedScores"].as_array().unwrap().is_empty());
        assert_eq!(json["metadata"]["totalCandidates"], 0);
        assert_eq!(json["metadata"]["processingTime"], 1.5);
        assert_eq!(json["metadata"]["cacheStats"]["hitRate"], 0.0);
    }
}
