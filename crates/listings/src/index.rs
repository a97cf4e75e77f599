//! In-memory property datastore.
//!
//! `PropertyIndex` keeps the listings in a primary map plus secondary
//! indices by slug, property type and normalised location, so the
//! equality-filtered tier queries never scan the whole collection.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::query::{PropertyQuery, SearchQuery};
use crate::types::{Property, PropertyId, PropertyType, normalize_location};

#[derive(Debug, Default)]
pub struct PropertyIndex {
    pub(crate) properties: HashMap<PropertyId, Arc<Property>>,

    // Secondary indices
    pub(crate) slug_index: HashMap<String, PropertyId>,
    pub(crate) type_index: HashMap<PropertyType, BTreeSet<PropertyId>>,
    /// Keyed by [`normalize_location`]
    pub(crate) location_index: HashMap<String, BTreeSet<PropertyId>>,
}

impl PropertyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_property(&self, id: PropertyId) -> Option<&Arc<Property>> {
        self.properties.get(&id)
    }

    pub fn get_by_slug(&self, slug: &str) -> Option<&Arc<Property>> {
        self.slug_index
            .get(slug)
            .and_then(|id| self.properties.get(id))
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// All property ids in ascending order
    pub fn all_ids(&self) -> Vec<PropertyId> {
        let mut ids: Vec<PropertyId> = self.properties.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Insert or replace a property, keeping every index consistent.
    ///
    /// Returns the previous record stored under the same id.
    pub fn insert_property(&mut self, property: Property) -> Option<Arc<Property>> {
        let previous = self.remove_property(property.id);
        let id = property.id;

        self.slug_index.insert(property.slug.clone(), id);
        self.type_index
            .entry(property.property_type)
            .or_default()
            .insert(id);
        self.location_index
            .entry(normalize_location(&property.location))
            .or_default()
            .insert(id);
        self.properties.insert(id, Arc::new(property));

        previous
    }

    /// Remove a property and its index entries
    pub fn remove_property(&mut self, id: PropertyId) -> Option<Arc<Property>> {
        let property = self.properties.remove(&id)?;

        if self.slug_index.get(&property.slug) == Some(&id) {
            self.slug_index.remove(&property.slug);
        }
        if let Some(ids) = self.type_index.get_mut(&property.property_type) {
            ids.remove(&id);
        }
        let location_key = normalize_location(&property.location);
        if let Some(ids) = self.location_index.get_mut(&location_key) {
            ids.remove(&id);
            if ids.is_empty() {
                self.location_index.remove(&location_key);
            }
        }

        Some(property)
    }

    /// Run an equality-filtered query.
    ///
    /// Rows come back in ascending id order, at most `query.limit` of them.
    pub fn query(&self, query: &PropertyQuery) -> Vec<Arc<Property>> {
        let candidate_ids = self.candidate_ids(query);

        candidate_ids
            .into_iter()
            .filter_map(|id| self.properties.get(&id))
            .filter(|property| query.matches(property))
            .take(query.limit)
            .cloned()
            .collect()
    }

    /// Visitor search over active listings, ascending id order
    pub fn search(&self, query: &SearchQuery) -> Vec<Arc<Property>> {
        let limit = query.limit.unwrap_or(usize::MAX);

        self.all_ids()
            .into_iter()
            .filter_map(|id| self.properties.get(&id))
            .filter(|property| query.matches(property))
            .take(limit)
            .cloned()
            .collect()
    }

    /// Narrowest id set the secondary indices can offer for `query`
    fn candidate_ids(&self, query: &PropertyQuery) -> Vec<PropertyId> {
        let by_type = query
            .property_type
            .map(|t| self.type_index.get(&t).cloned().unwrap_or_default());
        let by_location = query.location.as_ref().map(|l| {
            self.location_index
                .get(&normalize_location(l))
                .cloned()
                .unwrap_or_default()
        });

        match (by_type, by_location) {
            (Some(types), Some(locations)) => types.intersection(&locations).copied().collect(),
            (Some(ids), None) | (None, Some(ids)) => ids.into_iter().collect(),
            (None, None) => self.all_ids(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::PriceRange;
    use crate::types::{Collection, Configuration, ListingStatus};

    fn listing(id: PropertyId, property_type: PropertyType, location: &str, price: f64) -> Property {
        Property {
            id,
            slug: format!("listing-{}", id),
            title: format!("Listing {}", id),
            property_type,
            collection: Collection::Featured,
            status: ListingStatus::Active,
            location: location.to_string(),
            latitude: None,
            longitude: None,
            amenities: BTreeSet::new(),
            configurations: vec![Configuration {
                price: Some(price),
                ..Default::default()
            }],
            images: vec![],
            developer: None,
        }
    }

    fn create_test_index() -> PropertyIndex {
        let mut index = PropertyIndex::new();
        index.insert_property(listing(1, PropertyType::Apartment, "Whitefield", 100.0));
        index.insert_property(listing(2, PropertyType::Apartment, "whitefield", 120.0));
        index.insert_property(listing(3, PropertyType::Apartment, "Indiranagar", 110.0));
        index.insert_property(listing(4, PropertyType::Villa, "Whitefield", 300.0));

        let mut inactive = listing(5, PropertyType::Apartment, "Whitefield", 105.0);
        inactive.status = ListingStatus::Inactive;
        index.insert_property(inactive);

        index
    }

    fn ids(properties: &[Arc<Property>]) -> Vec<PropertyId> {
        properties.iter().map(|p| p.id).collect()
    }

    #[test]
    fn test_empty_queries() {
        let index = PropertyIndex::new();

        assert!(index.get_property(1).is_none());
        assert!(index.get_by_slug("missing").is_none());
        assert!(index.query(&PropertyQuery::new(10)).is_empty());
        assert!(index.is_empty());
    }

    #[test]
    fn test_query_type_and_location_is_case_insensitive() {
        let index = create_test_index();
        let query = PropertyQuery::new(10)
            .with_type(PropertyType::Apartment)
            .with_location("WHITEFIELD");

        assert_eq!(ids(&index.query(&query)), vec![1, 2]);
    }

    #[test]
    fn test_query_excludes_id_and_inactive() {
        let index = create_test_index();
        let query = PropertyQuery::new(10)
            .with_location("Whitefield")
            .excluding(1);

        assert_eq!(ids(&index.query(&query)), vec![2, 4]);

        let with_inactive = query.include_inactive();
        assert_eq!(ids(&index.query(&with_inactive)), vec![2, 4, 5]);
    }

    #[test]
    fn test_query_price_range_and_limit() {
        let index = create_test_index();
        let query = PropertyQuery::new(10)
            .with_type(PropertyType::Apartment)
            .with_price_range(PriceRange::new(105.0, 125.0));
        assert_eq!(ids(&index.query(&query)), vec![2, 3]);

        let limited = PropertyQuery::new(1).with_type(PropertyType::Apartment);
        assert_eq!(ids(&index.query(&limited)), vec![1]);
    }

    #[test]
    fn test_insert_replaces_and_reindexes() {
        let mut index = create_test_index();
        let moved = listing(1, PropertyType::Apartment, "Koramangala", 100.0);

        let previous = index.insert_property(moved);
        assert_eq!(previous.map(|p| p.location.clone()), Some("Whitefield".to_string()));

        let whitefield = PropertyQuery::new(10).with_location("Whitefield");
        assert!(!ids(&index.query(&whitefield)).contains(&1));

        let koramangala = PropertyQuery::new(10).with_location("Koramangala");
        assert_eq!(ids(&index.query(&koramangala)), vec![1]);
        assert_eq!(index.len(), 5);
    }

    #[test]
    fn test_remove_property_clears_slug() {
        let mut index = create_test_index();
        assert!(index.remove_property(2).is_some());
        assert!(index.get_by_slug("listing-2").is_none());
        assert!(index.remove_property(2).is_none());
    }

    #[test]
    fn test_search_substring_location() {
        let index = create_test_index();
        let query = SearchQuery {
            location: Some("field".to_string()),
            max_price: Some(150.0),
            ..Default::default()
        };

        assert_eq!(ids(&index.search(&query)), vec![1, 2]);
    }
}
