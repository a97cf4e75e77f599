//! Query surface of the property datastore.
//!
//! [`PropertyQuery`] is the equality-filter query the recommendation tiers
//! issue; [`SearchQuery`] is the looser visitor-facing search.

use serde::{Deserialize, Serialize};

use crate::types::{Collection, Property, PropertyId, PropertyType, normalize_location};

/// Inclusive price interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Range covering `price` ± `band` (a fraction, e.g. 0.3 for ±30%)
    pub fn around(price: f64, band: f64) -> Self {
        Self::new(price * (1.0 - band), price * (1.0 + band))
    }

    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && price <= self.max
    }

    /// Widen the range so it covers `price`
    pub fn include(&mut self, price: f64) {
        self.min = self.min.min(price);
        self.max = self.max.max(price);
    }
}

/// Filtered read against the property collection
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyQuery {
    pub property_type: Option<PropertyType>,
    /// Exact (case-insensitive) location match
    pub location: Option<String>,
    /// At least one configuration priced inside this range
    pub price_range: Option<PriceRange>,
    pub exclude_id: Option<PropertyId>,
    pub active_only: bool,
    pub limit: usize,
}

impl PropertyQuery {
    /// Active listings only, capped at `limit` rows
    pub fn new(limit: usize) -> Self {
        Self {
            property_type: None,
            location: None,
            price_range: None,
            exclude_id: None,
            active_only: true,
            limit,
        }
    }

    pub fn with_type(mut self, property_type: PropertyType) -> Self {
        self.property_type = Some(property_type);
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_price_range(mut self, range: PriceRange) -> Self {
        self.price_range = Some(range);
        self
    }

    pub fn excluding(mut self, id: PropertyId) -> Self {
        self.exclude_id = Some(id);
        self
    }

    pub fn include_inactive(mut self) -> Self {
        self.active_only = false;
        self
    }

    pub fn matches(&self, property: &Property) -> bool {
        if self.active_only && !property.is_active() {
            return false;
        }
        if self.exclude_id == Some(property.id) {
            return false;
        }
        if let Some(property_type) = self.property_type
            && property.property_type != property_type
        {
            return false;
        }
        if let Some(location) = &self.location
            && normalize_location(&property.location) != normalize_location(location)
        {
            return false;
        }
        if let Some(range) = &self.price_range
            && !property.has_price_within(range.min, range.max)
        {
            return false;
        }
        true
    }
}

/// Visitor-facing search; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Case-insensitive substring of the location name
    pub location: Option<String>,
    pub property_type: Option<PropertyType>,
    pub collection: Option<Collection>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub limit: Option<usize>,
}

impl SearchQuery {
    pub fn matches(&self, property: &Property) -> bool {
        if !property.is_active() {
            return false;
        }
        if let Some(location) = &self.location
            && !normalize_location(&property.location).contains(&normalize_location(location))
        {
            return false;
        }
        if self.property_type.is_some_and(|t| t != property.property_type) {
            return false;
        }
        if self.collection.is_some_and(|c| c != property.collection) {
            return false;
        }
        if self.min_price.is_some() || self.max_price.is_some() {
            let min = self.min_price.unwrap_or(0.0);
            let max = self.max_price.unwrap_or(f64::INFINITY);
            if !property.has_price_within(min, max) {
                return false;
            }
        }
        true
    }
}
