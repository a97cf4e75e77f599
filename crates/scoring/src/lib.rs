//! Similarity engine for property recommendations.
//!
//! This crate provides:
//! - Per-factor scoring (location, type, price, size, amenities, collection, developer)
//! - `SimilarityConfig`, a validated weight and tolerance set
//! - `SimilarityEngine` for scoring and ranking candidates
//!
//! ## Architecture
//! Each factor is normalised to `[0, 1]`; the aggregate is their weighted
//! sum under weights that sum to 1.0, rounded to two decimals.
//!
//! ## Example Usage
//! ```ignore
//! use scoring::{SimilarityConfig, SimilarityEngine};
//!
//! let engine = SimilarityEngine::new(SimilarityConfig::default())?;
//! let top = engine.find_similar_properties(&current, &candidates, 6);
//! ```

pub mod config;
pub mod factors;
pub mod engine;

// Re-export main types
pub use config::{ConfigError, SimilarityConfig, SimilarityWeights, validate_weight_set};
pub use engine::{FactorScores, SimilarityEngine, SimilarityScore, rank_order, round2};
