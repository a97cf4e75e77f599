//! Core domain types for property listings.
//!
//! A [`Property`] is owned and mutated only by the datastore; everything
//! downstream reads it through shared references or `Arc<Property>`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::ListingError;

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a property listing
pub type PropertyId = u64;

/// Unique identifier for a developer
pub type DeveloperId = u64;

// =============================================================================
// Enumerations
// =============================================================================

/// Kind of property on offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PropertyType {
    House,
    Apartment,
    Commercial,
    Land,
    Villa,
    Penthouse,
}

impl PropertyType {
    pub const ALL: [PropertyType; 6] = [
        PropertyType::House,
        PropertyType::Apartment,
        PropertyType::Commercial,
        PropertyType::Land,
        PropertyType::Villa,
        PropertyType::Penthouse,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::House => "House",
            PropertyType::Apartment => "Apartment",
            PropertyType::Commercial => "Commercial",
            PropertyType::Land => "Land",
            PropertyType::Villa => "Villa",
            PropertyType::Penthouse => "Penthouse",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyType {
    type Err = ListingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PropertyType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ListingError::InvalidValue {
                field: "property_type".to_string(),
                value: s.to_string(),
            })
    }
}

/// Marketing collection a listing is published under
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Collection {
    #[serde(rename = "Newly Launched")]
    NewlyLaunched,
    Featured,
    #[serde(rename = "Ready to Move")]
    ReadyToMove,
    #[serde(rename = "Under Construction")]
    UnderConstruction,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::NewlyLaunched,
        Collection::Featured,
        Collection::ReadyToMove,
        Collection::UnderConstruction,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::NewlyLaunched => "Newly Launched",
            Collection::Featured => "Featured",
            Collection::ReadyToMove => "Ready to Move",
            Collection::UnderConstruction => "Under Construction",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = ListingError;

    /// Accepts the display name ("Ready to Move") or a compact form ("ready-to-move")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_label(s);
        Collection::ALL
            .into_iter()
            .find(|c| normalize_label(c.as_str()) == wanted)
            .ok_or_else(|| ListingError::InvalidValue {
                field: "collection".to_string(),
                value: s.to_string(),
            })
    }
}

fn normalize_label(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Publication status of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    #[default]
    Active,
    Inactive,
}

// =============================================================================
// Property and nested records
// =============================================================================

/// One sellable configuration of a property (e.g. a 2BHK unit)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub price: Option<f64>,
    /// Carpet area in square feet
    pub area: Option<f64>,
    #[serde(default)]
    pub bedrooms: u8,
    #[serde(default)]
    pub bathrooms: u8,
    pub ready_by: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    #[serde(default)]
    pub alt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Developer {
    pub id: DeveloperId,
    pub name: String,
}

/// A property listing as returned by the datastore
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    pub slug: String,
    pub title: String,
    pub property_type: PropertyType,
    pub collection: Collection,
    #[serde(default)]
    pub status: ListingStatus,
    /// Locality name, e.g. "Whitefield"
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default)]
    pub amenities: BTreeSet<String>,
    #[serde(default)]
    pub configurations: Vec<Configuration>,
    #[serde(default)]
    pub images: Vec<Image>,
    pub developer: Option<Developer>,
}

impl Property {
    /// Lowest positive configuration price, if any configuration is priced
    pub fn lowest_price(&self) -> Option<f64> {
        self.configurations
            .iter()
            .filter_map(|c| c.price)
            .filter(|p| p.is_finite() && *p > 0.0)
            .reduce(f64::min)
    }

    /// Average of the positive configuration areas
    pub fn average_area(&self) -> Option<f64> {
        let areas: Vec<f64> = self
            .configurations
            .iter()
            .filter_map(|c| c.area)
            .filter(|a| a.is_finite() && *a > 0.0)
            .collect();

        if areas.is_empty() {
            None
        } else {
            Some(areas.iter().sum::<f64>() / areas.len() as f64)
        }
    }

    /// `(latitude, longitude)` when both are present
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }

    pub fn developer_id(&self) -> Option<DeveloperId> {
        self.developer.as_ref().map(|d| d.id)
    }

    pub fn is_active(&self) -> bool {
        self.status == ListingStatus::Active
    }

    /// Whether any priced configuration falls within `[min, max]`
    pub fn has_price_within(&self, min: f64, max: f64) -> bool {
        self.configurations
            .iter()
            .filter_map(|c| c.price)
            .any(|p| p >= min && p <= max)
    }
}

/// Normalised form of a location name used for equality lookups
pub fn normalize_location(location: &str) -> String {
    location.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn property_with(configurations: Vec<Configuration>) -> Property {
        Property {
            id: 1,
            slug: "sunrise-heights".to_string(),
            title: "Sunrise Heights".to_string(),
            property_type: PropertyType::Apartment,
            collection: Collection::Featured,
            status: ListingStatus::Active,
            location: "Whitefield".to_string(),
            latitude: Some(12.97),
            longitude: None,
            amenities: BTreeSet::new(),
            configurations,
            images: vec![],
            developer: None,
        }
    }

    #[test]
    fn test_lowest_price_ignores_missing_and_zero() {
        let property = property_with(vec![
            Configuration { price: Some(9_000_000.0), ..Default::default() },
            Configuration { price: None, ..Default::default() },
            Configuration { price: Some(0.0), ..Default::default() },
            Configuration { price: Some(7_500_000.0), ..Default::default() },
        ]);

        assert_eq!(property.lowest_price(), Some(7_500_000.0));
    }

    #[test]
    fn test_average_area() {
        let property = property_with(vec![
            Configuration { area: Some(1000.0), ..Default::default() },
            Configuration { area: Some(1500.0), ..Default::default() },
            Configuration { area: None, ..Default::default() },
        ]);

        assert_eq!(property.average_area(), Some(1250.0));
        assert_eq!(property_with(vec![]).average_area(), None);
    }

    #[test]
    fn test_coordinates_require_both_axes() {
        let mut property = property_with(vec![]);
        assert!(property.coordinates().is_none());

        property.longitude = Some(77.75);
        assert_eq!(property.coordinates(), Some((12.97, 77.75)));
    }

    #[test]
    fn test_property_type_from_str() {
        assert_eq!("villa".parse::<PropertyType>().unwrap(), PropertyType::Villa);
        assert_eq!(" Penthouse ".parse::<PropertyType>().unwrap(), PropertyType::Penthouse);
        assert!("castle".parse::<PropertyType>().is_err());
    }

    #[test]
    fn test_collection_from_str_accepts_compact_form() {
        assert_eq!("ready-to-move".parse::<Collection>().unwrap(), Collection::ReadyToMove);
        assert_eq!("Newly Launched".parse::<Collection>().unwrap(), Collection::NewlyLaunched);
        assert!("sold-out".parse::<Collection>().is_err());
    }

    #[test]
    fn test_collection_serde_names() {
        let json = serde_json::to_string(&Collection::UnderConstruction).unwrap();
        assert_eq!(json, "\"Under Construction\"");

        let parsed: Collection = serde_json::from_str("\"Ready to Move\"").unwrap();
        assert_eq!(parsed, Collection::ReadyToMove);
    }
}
