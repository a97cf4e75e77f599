//! Personalization service: records interactions and re-ranks candidates.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use listings::{Property, PropertyId};
use parking_lot::Mutex;
use scoring::{ConfigError, SimilarityScore, rank_order};
use tracing::{debug, instrument};

use crate::blend::{self, BlendWeights, FALLBACK_REASON};
use crate::repository::{InMemoryPreferenceRepository, PreferenceRepository};
use crate::types::{
    InteractionType, PersonalizationFactors, PersonalizedRecommendation, UserBehavior,
    UserPreference, UserProfile,
};

pub struct PersonalizationService {
    repository: Arc<dyn PreferenceRepository>,
    weights: BlendWeights,
    /// Serialises load-modify-store cycles on the repository
    update_lock: Mutex<()>,
}

impl PersonalizationService {
    pub fn new(
        repository: Arc<dyn PreferenceRepository>,
        weights: BlendWeights,
    ) -> Result<Self, ConfigError> {
        weights.validate()?;
        Ok(Self {
            repository,
            weights,
            update_lock: Mutex::new(()),
        })
    }

    /// Service over a fresh in-memory repository with default weights
    pub fn in_memory() -> Self {
        Self {
            repository: Arc::new(InMemoryPreferenceRepository::new()),
            weights: BlendWeights::default(),
            update_lock: Mutex::new(()),
        }
    }

    pub fn weights(&self) -> &BlendWeights {
        &self.weights
    }

    /// Fold one interaction event into the user's history and preferences
    #[instrument(skip(self, property), fields(property_id = property.id))]
    pub fn update_preferences(&self, user_id: &str, property: &Property, interaction: InteractionType) {
        let _guard = self.update_lock.lock();
        let now = Utc::now();

        let mut profile = self
            .repository
            .load(user_id)
            .unwrap_or_else(|| UserProfile::new(now));
        profile.behavior.record(property, interaction, now);
        profile.preference.accumulate(property, now);
        self.repository.store(user_id, profile);

        debug!("Recorded {} interaction", interaction);
    }

    /// Re-rank `scores` for `user_id`.
    ///
    /// Users without a stored profile get the similarity scores back
    /// unchanged and in the same order.
    pub fn get_personalized_recommendations(
        &self,
        user_id: &str,
        current: &Property,
        candidates: &[Arc<Property>],
        scores: &[SimilarityScore],
    ) -> Vec<PersonalizedRecommendation> {
        let Some(profile) = self.repository.load(user_id) else {
            debug!(user_id, "No profile, using similarity scores as-is");
            return scores.iter().map(cold_start).collect();
        };

        let by_id: HashMap<PropertyId, &Property> =
            candidates.iter().map(|p| (p.id, p.as_ref())).collect();

        let mut recommendations: Vec<PersonalizedRecommendation> = scores
            .iter()
            .filter(|score| score.property_id() != current.id)
            .filter_map(|score| {
                let candidate = by_id.get(&score.property_id())?;
                let factors = PersonalizationFactors {
                    preference: blend::preference_score(&profile.preference, candidate),
                    behavior: blend::behavior_score(&profile.behavior, candidate),
                    similarity: score.score(),
                };
                Some(PersonalizedRecommendation {
                    property_id: score.property_id(),
                    score: self.weights.blend(&factors),
                    reason: blend::reason_for(&factors),
                    factors,
                })
            })
            .collect();

        recommendations.sort_by(|a, b| rank_order(a.score, a.property_id, b.score, b.property_id));
        recommendations
    }

    pub fn profile(&self, user_id: &str) -> Option<UserProfile> {
        self.repository.load(user_id)
    }

    pub fn preferences(&self, user_id: &str) -> Option<UserPreference> {
        self.profile(user_id).map(|p| p.preference)
    }

    pub fn behavior(&self, user_id: &str) -> Option<UserBehavior> {
        self.profile(user_id).map(|p| p.behavior)
    }

    /// Forget everything about `user_id`
    pub fn clear_user(&self, user_id: &str) -> bool {
        let _guard = self.update_lock.lock();
        self.repository.remove(user_id)
    }

    pub fn user_count(&self) -> usize {
        self.repository.user_count()
    }
}

fn cold_start(score: &SimilarityScore) -> PersonalizedRecommendation {
    PersonalizedRecommendation {
        property_id: score.property_id(),
        score: score.score(),
        reason: FALLBACK_REASON.to_string(),
        factors: PersonalizationFactors {
            preference: 0.0,
            behavior: 0.0,
            similarity: score.score(),
        },
    }
}
