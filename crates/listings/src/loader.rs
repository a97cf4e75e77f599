//! Loading listings from JSON exports of the property collection.
//!
//! The export is a JSON array of property objects with nested
//! configurations, images and developer records.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{ListingError, Result};
use crate::index::PropertyIndex;
use crate::types::{Property, PropertyId};

impl PropertyIndex {
    /// Load and validate a listings export from disk
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading property listings from {:?}", path);
        let content = fs::read_to_string(path)?;
        let index = Self::from_json_str(&content)?;
        info!("Loaded {} property listings", index.len());
        Ok(index)
    }

    /// Parse a JSON array of properties, validate it and build the index
    pub fn from_json_str(content: &str) -> Result<Self> {
        let properties: Vec<Property> = serde_json::from_str(content)?;
        debug!("Parsed {} property records", properties.len());

        validate_listings(&properties)?;

        let mut index = PropertyIndex::new();
        for property in properties {
            index.insert_property(property);
        }
        Ok(index)
    }
}

/// Check that:
/// - slugs are unique
/// - coordinates are on the globe
/// - prices and areas are not negative
pub fn validate_listings(properties: &[Property]) -> Result<()> {
    let mut seen_slugs: HashMap<&str, PropertyId> = HashMap::new();

    for property in properties {
        if let Some(&first) = seen_slugs.get(property.slug.as_str()) {
            return Err(ListingError::DuplicateSlug {
                slug: property.slug.clone(),
                first,
                second: property.id,
            });
        }
        seen_slugs.insert(property.slug.as_str(), property.id);

        validate_property(property)?;
    }
    Ok(())
}

fn validate_property(property: &Property) -> Result<()> {
    if property.slug.trim().is_empty() {
        return Err(invalid(property, "slug is empty"));
    }
    if let Some(lat) = property.latitude
        && !(-90.0..=90.0).contains(&lat)
    {
        return Err(invalid(property, format!("latitude {} out of range", lat)));
    }
    if let Some(lon) = property.longitude
        && !(-180.0..=180.0).contains(&lon)
    {
        return Err(invalid(property, format!("longitude {} out of range", lon)));
    }
    for configuration in &property.configurations {
        if configuration.price.is_some_and(|p| p < 0.0) {
            return Err(invalid(property, "negative configuration price"));
        }
        if configuration.area.is_some_and(|a| a < 0.0) {
            return Err(invalid(property, "negative configuration area"));
        }
    }
    Ok(())
}

fn invalid(property: &Property, reason: impl Into<String>) -> ListingError {
    ListingError::ValidationError {
        id: property.id,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Collection, PropertyType};

    const SAMPLE: &str = r#"[
        {
            "id": 1,
            "slug": "palm-grove",
            "title": "Palm Grove Residences",
            "property_type": "Apartment",
            "collection": "Ready to Move",
            "location": "Whitefield",
            "latitude": 12.9698,
            "longitude": 77.7500,
            "amenities": ["Gym", "Pool"],
            "configurations": [
                { "price": 8500000, "area": 1200, "bedrooms": 2, "bathrooms": 2, "ready_by": "2025-03-01" }
            ],
            "images": [{ "url": "https://img.example/palm-grove.jpg" }],
            "developer": { "id": 7, "name": "Prestige" }
        },
        {
            "id": 2,
            "slug": "old-town-plot",
            "title": "Old Town Plot",
            "property_type": "Land",
            "collection": "Featured",
            "status": "inactive",
            "location": "Hosur",
            "latitude": null,
            "longitude": null,
            "developer": null
        }
    ]"#;

    #[test]
    fn test_from_json_str() {
        let index = PropertyIndex::from_json_str(SAMPLE).unwrap();
        assert_eq!(index.len(), 2);

        let palm = index.get_by_slug("palm-grove").unwrap();
        assert_eq!(palm.property_type, PropertyType::Apartment);
        assert_eq!(palm.collection, Collection::ReadyToMove);
        assert_eq!(palm.amenities.len(), 2);
        assert_eq!(palm.lowest_price(), Some(8_500_000.0));
        assert_eq!(palm.developer_id(), Some(7));

        let plot = index.get_property(2).unwrap();
        assert!(!plot.is_active());
        assert!(plot.configurations.is_empty());
    }

    #[test]
    fn test_duplicate_slug_rejected() {
        let json = SAMPLE.replace("old-town-plot", "palm-grove");
        let result = PropertyIndex::from_json_str(&json);
        assert!(matches!(
            result,
            Err(ListingError::DuplicateSlug { first: 1, second: 2, .. })
        ));
    }

    #[test]
    fn test_out_of_range_latitude_rejected() {
        let json = SAMPLE.replace("12.9698", "123.5");
        let result = PropertyIndex::from_json_str(&json);
        assert!(matches!(result, Err(ListingError::ValidationError { id: 1, .. })));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let result = PropertyIndex::from_json_str("[{ \"id\": 1 ");
        assert!(matches!(result, Err(ListingError::ParseError(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = PropertyIndex::load_from_file(Path::new("does/not/exist.json"));
        assert!(matches!(result, Err(ListingError::IoError(_))));
    }
}
