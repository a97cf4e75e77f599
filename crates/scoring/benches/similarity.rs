//! Benchmarks for similarity scoring
//!
//! Run with: cargo bench --package scoring
//!
//! Scores a synthetic neighbourhood of listings around a single property.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use listings::{Collection, Configuration, ListingStatus, Property, PropertyType};
use scoring::SimilarityEngine;
use std::sync::Arc;

fn synthetic_property(id: u64) -> Property {
    let types = PropertyType::ALL;
    let collections = Collection::ALL;
    let amenities = ["Gym", "Pool", "Clubhouse", "Park", "Security", "Lift"];

    Property {
        id,
        slug: format!("listing-{}", id),
        title: format!("Listing {}", id),
        property_type: types[id as usize % types.len()],
        collection: collections[id as usize % collections.len()],
        status: ListingStatus::Active,
        location: "Whitefield".to_string(),
        latitude: Some(12.9698 + (id % 50) as f64 * 0.002),
        longitude: Some(77.7500 - (id % 30) as f64 * 0.002),
        amenities: amenities
            .iter()
            .take(1 + id as usize % amenities.len())
            .map(|s| s.to_string())
            .collect(),
        configurations: vec![Configuration {
            price: Some(5_000_000.0 + (id % 40) as f64 * 125_000.0),
            area: Some(800.0 + (id % 25) as f64 * 40.0),
            bedrooms: 2,
            bathrooms: 2,
            ready_by: None,
        }],
        images: vec![],
        developer: None,
    }
}

fn bench_calculate_similarity(c: &mut Criterion) {
    let engine = SimilarityEngine::default();
    let current = synthetic_property(0);
    let candidate = synthetic_property(17);

    c.bench_function("calculate_similarity", |b| {
        b.iter(|| black_box(engine.calculate_similarity(black_box(&current), black_box(&candidate))))
    });
}

fn bench_find_similar(c: &mut Criterion) {
    let engine = SimilarityEngine::default();
    let current = synthetic_property(0);

    let mut group = c.benchmark_group("find_similar_properties");
    for size in [18usize, 200, 2000] {
        let candidates: Vec<Arc<Property>> =
            (1..=size as u64).map(|id| Arc::new(synthetic_property(id))).collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), &candidates, |b, candidates| {
            b.iter(|| black_box(engine.find_similar_properties(&current, candidates, 6)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_calculate_similarity, bench_find_similar);
criterion_main!(benches);
