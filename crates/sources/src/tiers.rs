//! Named query strategies, most to least restrictive.

use std::fmt;

use listings::{PriceRange, Property, PropertyQuery};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// Same type and location, priced within the band around the current listing
    TypeLocationPrice,
    TypeLocation,
    TypeOnly,
    LocationOnly,
}

impl Tier {
    pub const ALL: [Tier; 4] = [
        Tier::TypeLocationPrice,
        Tier::TypeLocation,
        Tier::TypeOnly,
        Tier::LocationOnly,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Tier::TypeLocationPrice => "type+location+price",
            Tier::TypeLocation => "type+location",
            Tier::TypeOnly => "type",
            Tier::LocationOnly => "location",
        }
    }

    /// Active listings other than `current` matching this tier's filters.
    ///
    /// Without a price on `current` the price tier falls back to type and location.
    pub fn build_query(&self, current: &Property, limit: usize, price_band: f64) -> PropertyQuery {
        let base = PropertyQuery::new(limit).excluding(current.id);
        match self {
            Tier::TypeLocationPrice => {
                let query = base
                    .with_type(current.property_type)
                    .with_location(current.location.as_str());
                match current.lowest_price() {
                    Some(price) => query.with_price_range(PriceRange::around(price, price_band)),
                    None => query,
                }
            }
            Tier::TypeLocation => base
                .with_type(current.property_type)
                .with_location(current.location.as_str()),
            Tier::TypeOnly => base.with_type(current.property_type),
            Tier::LocationOnly => base.with_location(current.location.as_str()),
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use listings::{Collection, Configuration, ListingStatus, PropertyType};

    fn current(price: Option<f64>) -> Property {
        Property {
            id: 9,
            slug: "current".to_string(),
            title: "Current".to_string(),
            property_type: PropertyType::Apartment,
            collection: Collection::Featured,
            status: ListingStatus::Active,
            location: "Whitefield".to_string(),
            latitude: None,
            longitude: None,
            amenities: Default::default(),
            configurations: vec![Configuration {
                price,
                ..Default::default()
            }],
            images: vec![],
            developer: None,
        }
    }

    #[test]
    fn test_queries_exclude_current_and_stay_active() {
        let property = current(Some(100.0));
        for tier in Tier::ALL {
            let query = tier.build_query(&property, 18, 0.3);
            assert_eq!(query.exclude_id, Some(9), "{tier}");
            assert!(query.active_only);
            assert_eq!(query.limit, 18);
        }
    }

    #[test]
    fn test_price_tier_narrows_by_band() {
        let query = Tier::TypeLocationPrice.build_query(&current(Some(100.0)), 6, 0.3);
        let range = query.price_range.unwrap();
        assert!((range.min - 70.0).abs() < 1e-9);
        assert!((range.max - 130.0).abs() < 1e-9);
    }

    #[test]
    fn test_price_tier_without_price_matches_type_location() {
        let property = current(None);
        let price_tier = Tier::TypeLocationPrice.build_query(&property, 6, 0.3);
        let plain = Tier::TypeLocation.build_query(&property, 6, 0.3);
        assert_eq!(price_tier, plain);
    }

    #[test]
    fn test_filters_per_tier() {
        let property = current(Some(100.0));
        let type_only = Tier::TypeOnly.build_query(&property, 6, 0.3);
        assert_eq!(type_only.property_type, Some(PropertyType::Apartment));
        assert!(type_only.location.is_none());

        let location_only = Tier::LocationOnly.build_query(&property, 6, 0.3);
        assert!(location_only.property_type.is_none());
        assert_eq!(location_only.location.as_deref(), Some("Whitefield"));
    }
}
