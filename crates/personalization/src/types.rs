//! Per-user records and personalized output types.

use std::collections::{BTreeSet, VecDeque};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use listings::{Collection, DeveloperId, PriceRange, Property, PropertyId, PropertyType, normalize_location};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Most recent viewed property ids kept per user
pub const MAX_VIEWED: usize = 50;
/// Most recent favorited property ids kept per user
pub const MAX_FAVORITED: usize = 20;
/// Most recent searched locations kept per user
pub const MAX_SEARCHED_LOCATIONS: usize = 20;

/// Kind of interaction event reported for a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionType {
    View,
    Favorite,
    Search,
    Contact,
}

impl InteractionType {
    pub const ALL: [InteractionType; 4] = [
        InteractionType::View,
        InteractionType::Favorite,
        InteractionType::Search,
        InteractionType::Contact,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionType::View => "view",
            InteractionType::Favorite => "favorite",
            InteractionType::Search => "search",
            InteractionType::Contact => "contact",
        }
    }
}

impl fmt::Display for InteractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown interaction type '{0}', expected one of view, favorite, search, contact")]
pub struct UnknownInteraction(pub String);

impl FromStr for InteractionType {
    type Err = UnknownInteraction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InteractionType::ALL
            .into_iter()
            .find(|i| i.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownInteraction(s.to_string()))
    }
}

/// Attributes a user has shown interest in, accumulated over time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreference {
    pub property_types: BTreeSet<PropertyType>,
    /// Widens to cover every priced property interacted with
    pub price_range: Option<PriceRange>,
    /// Normalised location names
    pub locations: BTreeSet<String>,
    pub amenities: BTreeSet<String>,
    pub collections: BTreeSet<Collection>,
    pub developer_ids: BTreeSet<DeveloperId>,
    pub last_updated: DateTime<Utc>,
}

impl UserPreference {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            property_types: BTreeSet::new(),
            price_range: None,
            locations: BTreeSet::new(),
            amenities: BTreeSet::new(),
            collections: BTreeSet::new(),
            developer_ids: BTreeSet::new(),
            last_updated: now,
        }
    }

    /// Union in the categorical attributes of `property` and widen the price range
    pub fn accumulate(&mut self, property: &Property, now: DateTime<Utc>) {
        self.property_types.insert(property.property_type);
        self.collections.insert(property.collection);

        let location = normalize_location(&property.location);
        if !location.is_empty() {
            self.locations.insert(location);
        }
        self.amenities.extend(property.amenities.iter().cloned());
        if let Some(id) = property.developer_id() {
            self.developer_ids.insert(id);
        }

        let prices = property
            .configurations
            .iter()
            .filter_map(|c| c.price)
            .filter(|p| p.is_finite() && *p > 0.0);
        for price in prices {
            match &mut self.price_range {
                Some(range) => range.include(price),
                None => self.price_range = Some(PriceRange::new(price, price)),
            }
        }

        self.last_updated = now;
    }
}

/// Bounded interaction history of a user, most recent last
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserBehavior {
    pub viewed: VecDeque<PropertyId>,
    pub favorited: VecDeque<PropertyId>,
    /// Normalised location names
    pub searched_locations: VecDeque<String>,
    pub searched_types: BTreeSet<PropertyType>,
    pub last_activity: DateTime<Utc>,
}

impl UserBehavior {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            viewed: VecDeque::new(),
            favorited: VecDeque::new(),
            searched_locations: VecDeque::new(),
            searched_types: BTreeSet::new(),
            last_activity: now,
        }
    }

    pub fn record(&mut self, property: &Property, interaction: InteractionType, now: DateTime<Utc>) {
        match interaction {
            InteractionType::View => push_recent(&mut self.viewed, property.id, MAX_VIEWED),
            InteractionType::Favorite => {
                push_recent(&mut self.favorited, property.id, MAX_FAVORITED)
            }
            InteractionType::Search => {
                let location = normalize_location(&property.location);
                if !location.is_empty() {
                    push_recent(&mut self.searched_locations, location, MAX_SEARCHED_LOCATIONS);
                }
                self.searched_types.insert(property.property_type);
            }
            InteractionType::Contact => {}
        }
        self.last_activity = now;
    }

    pub fn has_history(&self) -> bool {
        !(self.viewed.is_empty()
            && self.favorited.is_empty()
            && self.searched_locations.is_empty()
            && self.searched_types.is_empty())
    }
}

/// Move `item` to the most recent position, dropping the oldest past `cap`
fn push_recent<T: PartialEq>(history: &mut VecDeque<T>, item: T, cap: usize) {
    if let Some(pos) = history.iter().position(|existing| *existing == item) {
        history.remove(pos);
    }
    history.push_back(item);
    while history.len() > cap {
        history.pop_front();
    }
}

/// Everything stored for one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub preference: UserPreference,
    pub behavior: UserBehavior,
}

impl UserProfile {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            preference: UserPreference::new(now),
            behavior: UserBehavior::new(now),
        }
    }
}

/// Contributions behind a personalized score
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PersonalizationFactors {
    pub preference: f64,
    pub behavior: f64,
    pub similarity: f64,
}

/// A candidate re-scored for a specific user
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalizedRecommendation {
    pub property_id: PropertyId,
    pub score: f64,
    pub reason: String,
    pub factors: PersonalizationFactors,
}
