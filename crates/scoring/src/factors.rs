//! Individual similarity factors.
//!
//! Every function here is pure and returns a value in `[0, 1]`.
//! Missing optional data scores as neutral (0.5) or zero, never as an error.

use std::collections::BTreeSet;

use listings::{Collection, Property, PropertyType};

use crate::config::SimilarityConfig;

/// Mean Earth radius used by the haversine formula
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Score used when one side lacks the data a factor needs
pub const NEUTRAL_SCORE: f64 = 0.5;

const COMPATIBLE_TYPE_SCORE: f64 = 0.5;
const ADJACENT_COLLECTION_SCORE: f64 = 0.7;
const DISTANT_COLLECTION_SCORE: f64 = 0.3;
const OTHER_DEVELOPER_SCORE: f64 = 0.2;

/// Clamp to `[0, 1]`, mapping non-finite values to 0
pub fn sanitise(score: f64) -> f64 {
    if !score.is_finite() {
        return 0.0;
    }
    score.clamp(0.0, 1.0)
}

/// Great-circle distance in kilometres between two `(lat, lon)` points
pub fn haversine_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lon1) = (from.0.to_radians(), from.1.to_radians());
    let (lat2, lon2) = (to.0.to_radians(), to.1.to_radians());
    let d_lat = lat2 - lat1;
    let d_lon = lon2 - lon1;

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Exponential distance decay inside the configured radius
pub fn location_score(current: &Property, candidate: &Property, config: &SimilarityConfig) -> f64 {
    let (Some(from), Some(to)) = (current.coordinates(), candidate.coordinates()) else {
        return 0.0;
    };

    let distance = haversine_km(from, to);
    if distance > config.max_distance_km {
        return 0.0;
    }
    sanitise((-distance / config.distance_decay_km).exp())
}

/// Types that count as a partial match for `property_type`
pub fn compatible_types(property_type: PropertyType) -> &'static [PropertyType] {
    match property_type {
        PropertyType::Apartment => &[PropertyType::Penthouse, PropertyType::Villa],
        PropertyType::Penthouse => &[PropertyType::Apartment],
        PropertyType::Villa => &[PropertyType::Apartment, PropertyType::House],
        PropertyType::House => &[PropertyType::Villa],
        PropertyType::Commercial | PropertyType::Land => &[],
    }
}

pub fn type_score(current: PropertyType, candidate: PropertyType) -> f64 {
    if current == candidate {
        1.0
    } else if compatible_types(current).contains(&candidate) {
        COMPATIBLE_TYPE_SCORE
    } else {
        0.0
    }
}

/// Linear falloff from 1.0 at equality to 0.0 at `tolerance` relative difference.
///
/// Relative difference is `|a - b| / max(a, b)`.
pub fn linear_falloff(a: f64, b: f64, tolerance: f64) -> f64 {
    let larger = a.max(b);
    if larger <= 0.0 {
        return 1.0;
    }
    let relative_difference = (a - b).abs() / larger;
    sanitise(1.0 - relative_difference / tolerance)
}

/// Compares the lowest configuration price of each property
pub fn price_score(current: &Property, candidate: &Property, config: &SimilarityConfig) -> f64 {
    match (current.lowest_price(), candidate.lowest_price()) {
        (Some(a), Some(b)) => linear_falloff(a, b, config.price_tolerance),
        _ => NEUTRAL_SCORE,
    }
}

/// Compares the average configuration area of each property
pub fn size_score(current: &Property, candidate: &Property, config: &SimilarityConfig) -> f64 {
    match (current.average_area(), candidate.average_area()) {
        (Some(a), Some(b)) => linear_falloff(a, b, config.size_tolerance),
        _ => NEUTRAL_SCORE,
    }
}

/// Jaccard similarity; 1.0 when both sets are empty
pub fn jaccard<T: Ord>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let intersection = a.intersection(b).count() as f64;
    let union = a.union(b).count() as f64;
    intersection / union
}

pub fn amenity_score(current: &Property, candidate: &Property) -> f64 {
    sanitise(jaccard(&current.amenities, &candidate.amenities))
}

/// Collections that are considered close to `collection`
pub fn adjacent_collections(collection: Collection) -> &'static [Collection] {
    match collection {
        Collection::Featured => &[Collection::NewlyLaunched, Collection::ReadyToMove],
        Collection::NewlyLaunched => &[Collection::Featured, Collection::UnderConstruction],
        Collection::ReadyToMove => &[Collection::Featured],
        Collection::UnderConstruction => &[Collection::NewlyLaunched],
    }
}

pub fn collection_score(current: Collection, candidate: Collection) -> f64 {
    if current == candidate {
        1.0
    } else if adjacent_collections(current).contains(&candidate) {
        ADJACENT_COLLECTION_SCORE
    } else {
        DISTANT_COLLECTION_SCORE
    }
}

pub fn developer_score(current: &Property, candidate: &Property) -> f64 {
    match (current.developer_id(), candidate.developer_id()) {
        (Some(a), Some(b)) if a == b => 1.0,
        (Some(_), Some(_)) => OTHER_DEVELOPER_SCORE,
        _ => NEUTRAL_SCORE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use listings::{Configuration, Developer, ListingStatus};

    fn property(id: u64) -> Property {
        Property {
            id,
            slug: format!("p-{}", id),
            title: format!("Property {}", id),
            property_type: PropertyType::Apartment,
            collection: Collection::Featured,
            status: ListingStatus::Active,
            location: "Whitefield".to_string(),
            latitude: Some(12.9698),
            longitude: Some(77.7500),
            amenities: BTreeSet::new(),
            configurations: vec![],
            images: vec![],
            developer: None,
        }
    }

    fn priced(id: u64, price: f64, area: f64) -> Property {
        let mut p = property(id);
        p.configurations.push(Configuration {
            price: Some(price),
            area: Some(area),
            ..Default::default()
        });
        p
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_haversine_known_distance() {
        // Bengaluru MG Road to Whitefield is roughly 16 km
        let mg_road = (12.9756, 77.6050);
        let whitefield = (12.9698, 77.7500);
        let d = haversine_km(mg_road, whitefield);
        assert!((15.0..17.0).contains(&d), "distance was {}", d);
        assert_eq!(haversine_km(mg_road, mg_road), 0.0);
    }

    #[test]
    fn test_location_missing_coordinates_scores_zero() {
        let config = SimilarityConfig::default();
        let a = property(1);
        let mut b = property(2);
        b.longitude = None;
        assert_eq!(location_score(&a, &b, &config), 0.0);
    }

    #[test]
    fn test_location_beyond_radius_scores_zero() {
        let config = SimilarityConfig::default();
        let a = property(1);
        let mut b = property(2);
        b.latitude = Some(13.2);
        assert_eq!(location_score(&a, &b, &config), 0.0);
    }

    #[test]
    fn test_location_decays_exponentially() {
        let config = SimilarityConfig::default();
        let a = property(1);
        assert_eq!(location_score(&a, &a, &config), 1.0);

        let mut b = property(2);
        b.latitude = Some(12.9698 + 0.045); // ~5 km north
        let score = location_score(&a, &b, &config);
        assert!((score - (-1.0f64).exp()).abs() < 0.01, "score was {}", score);
    }

    #[test]
    fn test_type_score_table() {
        assert_eq!(type_score(PropertyType::Apartment, PropertyType::Apartment), 1.0);
        assert_eq!(type_score(PropertyType::Apartment, PropertyType::Penthouse), 0.5);
        assert_eq!(type_score(PropertyType::Penthouse, PropertyType::Apartment), 0.5);
        assert_eq!(type_score(PropertyType::Apartment, PropertyType::Land), 0.0);
    }

    #[test]
    fn test_compatibility_tables_are_symmetric() {
        for t in PropertyType::ALL {
            for other in compatible_types(t) {
                assert!(compatible_types(*other).contains(&t), "{t} <-> {other}");
            }
        }
        for c in Collection::ALL {
            for other in adjacent_collections(c) {
                assert!(adjacent_collections(*other).contains(&c), "{c} <-> {other}");
            }
        }
    }

    #[test]
    fn test_price_linear_falloff() {
        let config = SimilarityConfig::default();
        let base = priced(1, 100.0, 1000.0);

        assert_eq!(price_score(&base, &priced(2, 100.0, 1000.0), &config), 1.0);
        // 15% apart is half of the 30% tolerance
        let half = price_score(&base, &priced(2, 85.0, 1000.0), &config);
        assert!((half - 0.5).abs() < 1e-9);
        assert_eq!(price_score(&base, &priced(2, 50.0, 1000.0), &config), 0.0);
    }

    #[test]
    fn test_price_unknown_is_neutral() {
        let config = SimilarityConfig::default();
        assert_eq!(price_score(&priced(1, 100.0, 1.0), &property(2), &config), NEUTRAL_SCORE);
    }

    #[test]
    fn test_size_uses_average_area() {
        let config = SimilarityConfig::default();
        let mut a = priced(1, 100.0, 1000.0);
        a.configurations.push(Configuration {
            area: Some(2000.0),
            ..Default::default()
        });
        let b = priced(2, 100.0, 1500.0);
        assert_eq!(size_score(&a, &b, &config), 1.0);
    }

    #[test]
    fn test_jaccard_edge_cases() {
        assert_eq!(jaccard(&set(&[]), &set(&[])), 1.0);
        assert_eq!(jaccard(&set(&["Gym"]), &set(&[])), 0.0);
        assert_eq!(jaccard(&set(&["Gym", "Pool"]), &set(&["Pool", "Park"])), 1.0 / 3.0);
    }

    #[test]
    fn test_collection_scores() {
        assert_eq!(collection_score(Collection::Featured, Collection::Featured), 1.0);
        assert_eq!(collection_score(Collection::Featured, Collection::ReadyToMove), 0.7);
        assert_eq!(collection_score(Collection::ReadyToMove, Collection::UnderConstruction), 0.3);
    }

    #[test]
    fn test_developer_scores() {
        let mut a = property(1);
        let mut b = property(2);
        assert_eq!(developer_score(&a, &b), NEUTRAL_SCORE);

        a.developer = Some(Developer { id: 7, name: "Prestige".to_string() });
        assert_eq!(developer_score(&a, &b), NEUTRAL_SCORE);

        b.developer = Some(Developer { id: 7, name: "Prestige".to_string() });
        assert_eq!(developer_score(&a, &b), 1.0);

        b.developer = Some(Developer { id: 9, name: "Sobha".to_string() });
        assert_eq!(developer_score(&a, &b), OTHER_DEVELOPER_SCORE);
    }

    #[test]
    fn test_sanitise() {
        assert_eq!(sanitise(f64::NAN), 0.0);
        assert_eq!(sanitise(1.7), 1.0);
        assert_eq!(sanitise(-0.2), 0.0);
    }
}
