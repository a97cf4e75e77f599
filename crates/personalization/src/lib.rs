//! Per-user preference tracking and personalized re-ranking.
//!
//! Interaction events (view, favorite, search, contact) feed two records
//! per user: an accumulating `UserPreference` and a bounded `UserBehavior`
//! history. `PersonalizationService` blends both with raw similarity to
//! re-rank candidates; users without a record fall back to similarity alone.
//!
//! ## Example Usage
//! ```ignore
//! use personalization::{InteractionType, PersonalizationService};
//!
//! let service = PersonalizationService::in_memory();
//! service.update_preferences("visitor-1", &property, InteractionType::View);
//! let ranked = service.get_personalized_recommendations("visitor-1", &current, &candidates, &scores);
//! ```

pub mod types;
pub mod repository;
pub mod blend;
pub mod service;

// Re-export main types
pub use repository::{InMemoryPreferenceRepository, PreferenceRepository};
pub use blend::BlendWeights;
pub use service::PersonalizationService;
pub use types::{
    InteractionType, PersonalizationFactors, PersonalizedRecommendation, UserBehavior,
    UserPreference, UserProfile,
};
