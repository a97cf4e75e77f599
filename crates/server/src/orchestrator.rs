//! # Recommendation Service
//!
//! Coordinates the similar-properties flow for a property detail page:
//! 1. Look up the cached result set for the current property
//! 2. On a miss, fetch candidates through the four retrieval tiers concurrently.
//!    At least `default_limit` results are scored so a later request with a
//!    larger limit can still be answered from the cache
//! 3. Score them with the similarity engine on the blocking pool
//! 4. Personalize for a known visitor and record the view
//! 5. Cache the result set and return it with provenance metadata
//!
//! Every path ends in a valid response: tier failures shrink the candidate
//! set and an empty candidate set becomes a `fallback` response.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{debug, info, instrument, warn};

use cache::{CacheStats, RecommendationCache, SimilarResultSet};
use listings::{Property, PropertyId, SearchQuery};
use personalization::{
    InMemoryPreferenceRepository, InteractionType, PersonalizationService,
    PersonalizedRecommendation, UserPreference,
};
use scoring::{SimilarityEngine, SimilarityScore};
use sources::{PropertyStore, TieredRetriever};

use crate::config::ServiceConfig;
use crate::response::{Algorithm, ResponseMetadata, SimilarPropertiesResponse};

/// Entry point of the recommendation engine.
///
/// Cheap to clone; all components are shared.
#[derive(Clone)]
pub struct RecommendationService {
    store: Arc<dyn PropertyStore>,
    retriever: TieredRetriever,
    engine: Arc<SimilarityEngine>,
    cache: Arc<RecommendationCache>,
    personalization: Arc<PersonalizationService>,
    default_limit: usize,
}

impl RecommendationService {
    /// Assemble a service from explicitly constructed components
    pub fn new(
        store: Arc<dyn PropertyStore>,
        cache: Arc<RecommendationCache>,
        personalization: Arc<PersonalizationService>,
        config: &ServiceConfig,
    ) -> Result<Self> {
        config.validate()?;
        let engine = SimilarityEngine::new(config.similarity.clone())
            .context("Failed to build similarity engine")?;
        let retriever = TieredRetriever::new(store.clone(), config.retrieval.clone());

        Ok(Self {
            store,
            retriever,
            engine: Arc::new(engine),
            cache,
            personalization,
            default_limit: config.default_limit,
        })
    }

    /// Service with a fresh cache and in-memory personalization.
    ///
    /// Call from inside a tokio runtime so the cache sweeper starts.
    pub fn from_config(store: Arc<dyn PropertyStore>, config: &ServiceConfig) -> Result<Self> {
        let cache = Arc::new(RecommendationCache::new(config.cache.clone()));
        let personalization = PersonalizationService::new(
            Arc::new(InMemoryPreferenceRepository::new()),
            config.blend,
        )
        .context("Failed to build personalization service")?;

        Self::new(store, cache, Arc::new(personalization), config)
    }

    pub fn default_limit(&self) -> usize {
        self.default_limit
    }

    pub fn engine(&self) -> &SimilarityEngine {
        &self.engine
    }

    pub fn personalization(&self) -> &PersonalizationService {
        &self.personalization
    }

    /// Similar properties for `current`, personalized when `user_id` is given
    #[instrument(skip(self, current), fields(property_id = current.id))]
    pub async fn get_similar_properties(
        &self,
        current: &Property,
        user_id: Option<&str>,
        limit: usize,
    ) -> SimilarPropertiesResponse {
        let start_time = Instant::now();

        if let Some(cached) = self.cache.get_similar(current.id) {
            if cached.covers(limit) {
                debug!("Serving similar properties from cache");
                return self.cached_response(current, &cached, user_id, limit, start_time);
            }
            debug!(
                "Cached set was scored for {} results, recomputing for {}",
                cached.limit, limit
            );
        }

        let scored_limit = limit.max(self.default_limit);
        let tiered = self.retriever.fetch_candidates(current, scored_limit).await;
        let total_candidates = tiered.len();
        if tiered.is_empty() {
            info!("No candidates for property {}, returning fallback", current.id);
            return self.respond(
                Vec::new(),
                Vec::new(),
                Vec::new(),
                Algorithm::Fallback,
                0,
                start_time,
            );
        }

        let candidates = tiered.candidates;
        let scores = match self.score_candidates(current, &candidates, scored_limit).await {
            Ok(scores) => scores,
            Err(e) => {
                warn!("Similarity scoring failed: {:#}", e);
                return self.respond(
                    Vec::new(),
                    Vec::new(),
                    Vec::new(),
                    Algorithm::Fallback,
                    total_candidates,
                    start_time,
                );
            }
        };
        let properties = align_properties(&candidates, &scores);
        self.cache.set_similar(
            current.id,
            SimilarResultSet {
                properties: properties.clone(),
                scores: scores.clone(),
                limit: scored_limit,
                total_candidates,
            },
        );

        let properties: Vec<Arc<Property>> = properties.into_iter().take(limit).collect();
        let scores: Vec<SimilarityScore> = scores.into_iter().take(limit).collect();

        let personalized = match user_id {
            Some(user_id) => {
                let personalized = self.personalization.get_personalized_recommendations(
                    user_id,
                    current,
                    &properties,
                    &scores,
                );
                self.record_interaction(user_id, current, InteractionType::View);
                personalized
            }
            None => Vec::new(),
        };

        let response = self.respond(
            properties,
            scores,
            personalized,
            Algorithm::Similarity,
            total_candidates,
            start_time,
        );
        info!(
            "Recommended {} of {} candidates for property {} in {:.2}ms",
            response.properties.len(),
            total_candidates,
            current.id,
            response.metadata.processing_time
        );
        response
    }

    /// Scoring is CPU-bound, so it runs on the blocking pool
    async fn score_candidates(
        &self,
        current: &Property,
        candidates: &[Arc<Property>],
        limit: usize,
    ) -> Result<Vec<SimilarityScore>> {
        let engine = self.engine.clone();
        let current = current.clone();
        let candidates = candidates.to_vec();

        tokio::task::spawn_blocking(move || {
            engine.find_similar_properties(&current, &candidates, limit)
        })
        .await
        .context("Similarity scoring task panicked")
    }

    fn cached_response(
        &self,
        current: &Property,
        cached: &SimilarResultSet,
        user_id: Option<&str>,
        limit: usize,
        start_time: Instant,
    ) -> SimilarPropertiesResponse {
        let properties: Vec<Arc<Property>> = cached.properties.iter().take(limit).cloned().collect();
        let scores: Vec<SimilarityScore> = cached.scores.iter().take(limit).cloned().collect();

        let personalized = user_id
            .map(|user_id| {
                self.personalization
                    .get_personalized_recommendations(user_id, current, &properties, &scores)
            })
            .unwrap_or_default();

        let mut response = self.respond(
            properties,
            scores,
            personalized,
            Algorithm::Cached,
            cached.total_candidates,
            start_time,
        );
        response.cache_hit = true;
        response
    }

    fn respond(
        &self,
        properties: Vec<Arc<Property>>,
        scores: Vec<SimilarityScore>,
        personalized_scores: Vec<PersonalizedRecommendation>,
        algorithm: Algorithm,
        total_candidates: usize,
        start_time: Instant,
    ) -> SimilarPropertiesResponse {
        SimilarPropertiesResponse {
            properties,
            scores,
            personalized_scores,
            cache_hit: false,
            algorithm,
            metadata: ResponseMetadata {
                total_candidates,
                processing_time: start_time.elapsed().as_secs_f64() * 1000.0,
                cache_stats: self.cache.stats(),
            },
        }
    }

    /// Drop cached entries for a property that has been edited
    pub fn invalidate_cache(&self, property_id: PropertyId) -> usize {
        let removed = self.cache.invalidate_property(property_id);
        info!("Invalidated {} cache entries for property {}", removed, property_id);
        removed
    }

    /// Property by slug, through the cache
    pub async fn property_by_slug(&self, slug: &str) -> Option<Arc<Property>> {
        if let Some(property) = self.cache.get_property(slug) {
            return Some(property);
        }

        match self.store.find_by_slug(slug).await {
            Ok(Some(property)) => {
                self.cache.set_property(property.clone());
                Some(property)
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Lookup of '{}' failed: {}", slug, e);
                None
            }
        }
    }

    /// Visitor search, through the cache; a failed query yields no results
    pub async fn search(&self, query: &SearchQuery) -> Vec<Arc<Property>> {
        if let Some(results) = self.cache.get_search(query) {
            return results.as_ref().clone();
        }

        match self.store.search(query).await {
            Ok(results) => {
                self.cache.set_search(query, results.clone());
                results
            }
            Err(e) => {
                warn!("Search failed: {}", e);
                Vec::new()
            }
        }
    }

    /// Feed an interaction event into personalization
    pub fn record_interaction(&self, user_id: &str, property: &Property, interaction: InteractionType) {
        self.personalization
            .update_preferences(user_id, property, interaction);
        self.cache.remove_preferences(user_id);
    }

    /// Forget everything known about `user_id`, including its cached preferences
    pub fn clear_user(&self, user_id: &str) -> bool {
        let cleared = self.personalization.clear_user(user_id);
        self.cache.remove_preferences(user_id);
        if cleared {
            info!("Cleared personalization data of user {}", user_id);
        }
        cleared
    }

    /// Accumulated preferences of `user_id`, through the cache
    pub fn user_preferences(&self, user_id: &str) -> Option<Arc<UserPreference>> {
        if let Some(preferences) = self.cache.get_preferences(user_id) {
            return Some(preferences);
        }

        let preferences = self.personalization.preferences(user_id)?;
        self.cache.set_preferences(user_id, preferences);
        self.cache.get_preferences(user_id)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Stop background work owned by the service
    pub fn shutdown(&self) {
        self.cache.shutdown();
    }
}

/// Properties in the order of `scores`
fn align_properties(candidates: &[Arc<Property>], scores: &[SimilarityScore]) -> Vec<Arc<Property>> {
    let by_id: HashMap<PropertyId, &Arc<Property>> =
        candidates.iter().map(|p| (p.id, p)).collect();

    scores
        .iter()
        .filter_map(|score| by_id.get(&score.property_id()).map(|p| Arc::clone(p)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use listings::{Collection, ListingStatus, PropertyType};
    use scoring::FactorScores;

    fn listing(id: PropertyId) -> Arc<Property> {
        Arc::new(Property {
            id,
            slug: format!("listing-{}", id),
            title: format!("Listing {}", id),
            property_type: PropertyType::Apartment,
            collection: Collection::Featured,
            status: ListingStatus::Active,
            location: "Whitefield".to_string(),
            latitude: None,
            longitude: None,
            amenities: Default::default(),
            configurations: vec![],
            images: vec![],
            developer: None,
        })
    }

    fn score(id: PropertyId, value: f64) -> SimilarityScore {
        let factors = FactorScores {
            location: value,
            property_type: value,
            price: value,
            size: value,
            amenities: value,
            collection: value,
            developer: value,
        };
        SimilarityScore::from_parts(id, value, factors)
    }

    #[test]
    fn test_align_properties_follows_score_order() {
        let candidates = vec![listing(1), listing(2), listing(3)];
        let scores = vec![score(3, 0.9), score(1, 0.8)];

        let aligned = align_properties(&candidates, &scores);
        let ids: Vec<PropertyId> = aligned.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_align_properties_drops_unknown_ids() {
        let candidates = vec![listing(1)];
        let scores = vec![score(7, 0.9), score(1, 0.8)];
        assert_eq!(align_properties(&candidates, &scores).len(), 1);
    }
}
