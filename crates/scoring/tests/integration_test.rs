//! Integration tests for the similarity engine.
//!
//! These tests score a small but realistic neighbourhood of listings
//! loaded through the listings crate.

use listings::{PropertyIndex, PropertyQuery};
use scoring::{SimilarityConfig, SimilarityEngine, SimilarityWeights};

const NEIGHBOURHOOD: &str = r#"[
    {
        "id": 1, "slug": "palm-grove", "title": "Palm Grove",
        "property_type": "Apartment", "collection": "Featured",
        "location": "Whitefield", "latitude": 12.9698, "longitude": 77.7500,
        "amenities": ["Gym", "Pool", "Clubhouse"],
        "configurations": [{ "price": 8500000, "area": 1200, "bedrooms": 2, "bathrooms": 2 }],
        "developer": { "id": 7, "name": "Prestige" }
    },
    {
        "id": 2, "slug": "palm-grove-phase-2", "title": "Palm Grove Phase 2",
        "property_type": "Apartment", "collection": "Featured",
        "location": "Whitefield", "latitude": 12.9710, "longitude": 77.7520,
        "amenities": ["Gym", "Pool", "Clubhouse"],
        "configurations": [{ "price": 8700000, "area": 1250, "bedrooms": 2, "bathrooms": 2 }],
        "developer": { "id": 7, "name": "Prestige" }
    },
    {
        "id": 3, "slug": "skyline-penthouse", "title": "Skyline Penthouse",
        "property_type": "Penthouse", "collection": "Newly Launched",
        "location": "Whitefield", "latitude": 12.9800, "longitude": 77.7400,
        "amenities": ["Gym", "Pool", "Terrace"],
        "configurations": [{ "price": 10500000, "area": 1600, "bedrooms": 3, "bathrooms": 3 }],
        "developer": { "id": 9, "name": "Sobha" }
    },
    {
        "id": 4, "slug": "hosur-road-plot", "title": "Hosur Road Plot",
        "property_type": "Land", "collection": "Under Construction",
        "location": "Hosur", "latitude": 12.7409, "longitude": 77.8253,
        "configurations": [{ "price": 2500000, "area": 4000 }]
    },
    {
        "id": 5, "slug": "whitefield-budget", "title": "Whitefield Budget Homes",
        "property_type": "Apartment", "collection": "Ready to Move",
        "location": "Whitefield", "latitude": 12.9650, "longitude": 77.7600,
        "amenities": ["Gym"],
        "configurations": [{ "price": 6200000, "area": 950, "bedrooms": 2, "bathrooms": 1 }]
    }
]"#;

#[test]
fn test_ranking_over_neighbourhood() {
    let index = PropertyIndex::from_json_str(NEIGHBOURHOOD).unwrap();
    let current = index.get_by_slug("palm-grove").unwrap().clone();
    let candidates = index.query(&PropertyQuery::new(100));

    let engine = SimilarityEngine::new(SimilarityConfig::default()).unwrap();
    let scores = engine.find_similar_properties(&current, &candidates, 6);

    let ids: Vec<u64> = scores.iter().map(|s| s.property_id()).collect();
    assert_eq!(ids.first(), Some(&2), "the sister project should rank first");
    assert!(!ids.contains(&1), "current property must be excluded");
    assert!(!ids.contains(&4), "far-away land should fall below the threshold");

    for pair in scores.windows(2) {
        assert!(pair[0].score() >= pair[1].score());
    }
}

#[test]
fn test_custom_weights_change_ranking() {
    let index = PropertyIndex::from_json_str(NEIGHBOURHOOD).unwrap();
    let current = index.get_by_slug("palm-grove").unwrap().clone();
    let penthouse = index.get_by_slug("skyline-penthouse").unwrap().clone();
    let budget = index.get_by_slug("whitefield-budget").unwrap().clone();

    let default_engine = SimilarityEngine::default();
    let amenity_heavy = SimilarityEngine::new(
        SimilarityConfig::default().with_weights(SimilarityWeights {
            location: 0.05,
            property_type: 0.05,
            price: 0.05,
            size: 0.05,
            amenities: 0.70,
            collection: 0.05,
            developer: 0.05,
        }),
    )
    .unwrap();

    // Budget homes win on type and price by default...
    let default_budget = default_engine.calculate_similarity(&current, &budget).score();
    let default_penthouse = default_engine.calculate_similarity(&current, &penthouse).score();
    assert!(default_budget > default_penthouse);

    // ...but the penthouse shares more amenities
    let heavy_budget = amenity_heavy.calculate_similarity(&current, &budget).score();
    let heavy_penthouse = amenity_heavy.calculate_similarity(&current, &penthouse).score();
    assert!(heavy_penthouse > heavy_budget);
}
