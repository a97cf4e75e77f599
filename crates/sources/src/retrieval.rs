//! Tiered candidate retrieval.
//!
//! All four tiers are queried concurrently and awaited together. A tier
//! that fails contributes nothing; it never fails the whole retrieval.
//! Results are merged by property id with the earliest tier winning.

use std::collections::HashSet;
use std::sync::Arc;

use listings::{Property, PropertyId};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::store::{PropertyStore, StoreError};
use crate::tiers::Tier;

/// Candidate retrieval settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Raw candidates fetched per requested recommendation
    pub candidate_multiplier: usize,
    /// Relative price band of the first tier (0.3 = ±30%)
    pub price_band: f64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            candidate_multiplier: 3,
            price_band: 0.3,
        }
    }
}

/// What one tier contributed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierOutcome {
    pub tier: Tier,
    /// Rows returned by the store, before de-duplication
    pub fetched: usize,
    pub failed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TieredCandidates {
    /// Unique candidates in tier order
    pub candidates: Vec<Arc<Property>>,
    pub outcomes: Vec<TierOutcome>,
}

impl TieredCandidates {
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn failed_tiers(&self) -> Vec<Tier> {
        self.outcomes.iter().filter(|o| o.failed).map(|o| o.tier).collect()
    }
}

#[derive(Clone)]
pub struct TieredRetriever {
    store: Arc<dyn PropertyStore>,
    config: RetrievalConfig,
}

impl TieredRetriever {
    pub fn new(store: Arc<dyn PropertyStore>, config: RetrievalConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Fetch up to `candidate_multiplier × limit` candidates for `current`
    #[instrument(skip(self, current), fields(property_id = current.id))]
    pub async fn fetch_candidates(&self, current: &Property, limit: usize) -> TieredCandidates {
        let fetch_limit = limit.saturating_mul(self.config.candidate_multiplier);
        if fetch_limit == 0 {
            return TieredCandidates::default();
        }

        let [q1, q2, q3, q4] =
            Tier::ALL.map(|tier| tier.build_query(current, fetch_limit, self.config.price_band));

        let (r1, r2, r3, r4) = tokio::join!(
            self.store.find_properties(&q1),
            self.store.find_properties(&q2),
            self.store.find_properties(&q3),
            self.store.find_properties(&q4),
        );

        let results = Tier::ALL.into_iter().zip([r1, r2, r3, r4]);
        let merged = merge_tiers(results, fetch_limit);

        debug!(
            "Retrieved {} unique candidates from {} via {} tiers",
            merged.len(),
            self.store.name(),
            merged.outcomes.len()
        );
        merged
    }
}

/// Merge tier results in order, keeping the first occurrence of each id
pub fn merge_tiers<I>(results: I, cap: usize) -> TieredCandidates
where
    I: IntoIterator<Item = (Tier, Result<Vec<Arc<Property>>, StoreError>)>,
{
    let mut seen: HashSet<PropertyId> = HashSet::new();
    let mut merged = TieredCandidates::default();

    for (tier, result) in results {
        let rows = match result {
            Ok(rows) => rows,
            Err(e) => {
                warn!("Tier '{}' failed, treating as empty: {}", tier, e);
                merged.outcomes.push(TierOutcome {
                    tier,
                    fetched: 0,
                    failed: true,
                });
                continue;
            }
        };

        merged.outcomes.push(TierOutcome {
            tier,
            fetched: rows.len(),
            failed: false,
        });

        for property in rows {
            if merged.candidates.len() >= cap {
                break;
            }
            if seen.insert(property.id) {
                merged.candidates.push(property);
            }
        }
    }

    merged
}
