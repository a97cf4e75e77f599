//! Simple test harness for the recommendation service.
//!
//! Loads the sample listings, asks for similar properties twice for the
//! same listing (a cache miss, then a hit) and prints both responses.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use listings::PropertyIndex;
use server::{RecommendationService, ServiceConfig};
use sources::IndexStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server=debug,sources=debug,cache=debug".into()),
        )
        .init();

    info!("Starting property recommendation test harness");

    let index = PropertyIndex::load_from_file(Path::new("data/properties.json"))
        .context("Failed to load data/properties.json")?;
    let slug = index
        .all_ids()
        .first()
        .and_then(|id| index.get_property(*id))
        .map(|p| p.slug.clone())
        .context("No listings in data/properties.json")?;

    let store = Arc::new(IndexStore::new(index));
    let service = RecommendationService::from_config(store, &ServiceConfig::default())?;

    let current = service
        .property_by_slug(&slug)
        .await
        .with_context(|| format!("Listing '{}' vanished", slug))?;
    let user_id = "demo-visitor";
    let limit = service.default_limit();

    for attempt in 1..=2 {
        info!("Request {} for '{}' (limit: {})", attempt, current.title, limit);
        let response = service
            .get_similar_properties(&current, Some(user_id), limit)
            .await;

        info!(
            "algorithm={} cache_hit={} candidates={} time={:.2}ms",
            response.algorithm,
            response.cache_hit,
            response.metadata.total_candidates,
            response.metadata.processing_time
        );
        for (i, (property, score)) in response.properties.iter().zip(&response.scores).enumerate() {
            info!(
                "{}. {} [{} in {}] - Score: {:.2}",
                i + 1,
                property.title,
                property.property_type,
                property.location,
                score.score()
            );
        }
        for rec in &response.personalized_scores {
            info!("   personalized {} -> {:.2} ({})", rec.property_id, rec.score, rec.reason);
        }
    }

    info!("Cache stats: {:?}", service.cache_stats());
    service.shutdown();
    Ok(())
}
