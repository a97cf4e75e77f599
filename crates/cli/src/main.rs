use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use colored::Colorize;
use listings::{Collection, Property, PropertyIndex, PropertyType, SearchQuery};
use personalization::InteractionType;
use server::{RecommendationService, ServiceConfig, SimilarPropertiesResponse};
use sources::IndexStore;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::debug;

/// Property Recs - Similar property recommendations
#[derive(Parser)]
#[command(name = "property-recs")]
#[command(about = "Similar-property recommendations with caching and personalization", long_about = None)]
struct Cli {
    /// Path to the JSON export of property listings
    #[arg(short, long, default_value = "data/properties.json")]
    data: PathBuf,

    /// Optional JSON service configuration; omitted fields keep their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show properties similar to a listing
    Similar {
        /// Slug of the listing being viewed
        #[arg(long)]
        slug: String,

        /// Visitor id to personalize for
        #[arg(long)]
        user_id: Option<String>,

        /// Number of recommendations to return
        #[arg(long)]
        limit: Option<usize>,

        /// Slugs the visitor viewed earlier (comma separated)
        #[arg(long, value_delimiter = ',')]
        viewed: Vec<String>,

        /// Show per-factor scores for each recommendation
        #[arg(long)]
        explain: bool,
    },

    /// Show a single listing
    Property {
        #[arg(long)]
        slug: String,
    },

    /// Search active listings
    Search {
        /// Case-insensitive substring of the location
        #[arg(long)]
        location: Option<String>,

        #[arg(long = "type")]
        property_type: Option<PropertyType>,

        #[arg(long)]
        collection: Option<Collection>,

        #[arg(long)]
        min_price: Option<f64>,

        #[arg(long)]
        max_price: Option<f64>,

        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Run benchmark to test performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "10")]
        concurrent: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ServiceConfig::load_from_file(path)?,
        None => ServiceConfig::default(),
    };

    println!("Loading listings from {}...", cli.data.display());
    let start = Instant::now();
    let index = PropertyIndex::load_from_file(&cli.data).context("Failed to load property listings")?;
    println!(
        "{} Loaded {} listings in {:?}",
        "✓".green(),
        index.len(),
        start.elapsed()
    );

    let store = Arc::new(IndexStore::new(index));
    let service = RecommendationService::from_config(store.clone(), &config)?;

    // Dispatch to appropriate command handler
    let outcome = match cli.command {
        Commands::Similar {
            slug,
            user_id,
            limit,
            viewed,
            explain,
        } => {
            let limit = limit.unwrap_or(service.default_limit());
            handle_similar(&service, &slug, user_id.as_deref(), limit, &viewed, explain).await
        }
        Commands::Property { slug } => handle_property(&service, &slug).await,
        Commands::Search {
            location,
            property_type,
            collection,
            min_price,
            max_price,
            limit,
        } => {
            let query = SearchQuery {
                location,
                property_type,
                collection,
                min_price,
                max_price,
                limit: Some(limit),
            };
            handle_search(&service, &query).await
        }
        Commands::Benchmark {
            requests,
            concurrent,
        } => handle_benchmark(&service, &store, requests, concurrent).await,
    };

    service.shutdown();
    outcome
}

async fn find_listing(service: &RecommendationService, slug: &str) -> Result<Arc<Property>> {
    service
        .property_by_slug(slug)
        .await
        .ok_or_else(|| anyhow!("Listing '{}' not found", slug))
}

/// Handle the 'similar' command
async fn handle_similar(
    service: &RecommendationService,
    slug: &str,
    user_id: Option<&str>,
    limit: usize,
    viewed: &[String],
    explain: bool,
) -> Result<()> {
    let current = find_listing(service, slug).await?;

    if let Some(user_id) = user_id {
        for viewed_slug in viewed {
            let property = find_listing(service, viewed_slug).await?;
            service.record_interaction(user_id, &property, InteractionType::View);
        }
    } else if !viewed.is_empty() {
        return Err(anyhow!("--viewed needs a --user-id to attach the history to"));
    }

    let response = service.get_similar_properties(&current, user_id, limit).await;
    print_response(&current, &response, explain);
    Ok(())
}

/// Handle the 'property' command
async fn handle_property(service: &RecommendationService, slug: &str) -> Result<()> {
    let property = find_listing(service, slug).await?;

    println!("{}", format!("{} ({})", property.title, property.slug).bold().blue());
    println!("{}Type: {}", "• ".green(), property.property_type);
    println!("{}Collection: {}", "• ".green(), property.collection);
    println!("{}Location: {}", "• ".green(), property.location);
    if let Some((lat, lon)) = property.coordinates() {
        println!("{}Coordinates: {:.4}, {:.4}", "• ".green(), lat, lon);
    }
    if let Some(developer) = &property.developer {
        println!("{}Developer: {}", "• ".green(), developer.name);
    }
    if !property.amenities.is_empty() {
        let amenities: Vec<&str> = property.amenities.iter().map(String::as_str).collect();
        println!("{}Amenities: {}", "• ".green(), amenities.join(", "));
    }

    println!("Configurations:");
    for configuration in &property.configurations {
        println!(
            "  - {} bed / {} bath, {} sq ft, {}",
            configuration.bedrooms,
            configuration.bathrooms,
            configuration.area.map(|a| format!("{:.0}", a)).unwrap_or_else(|| "?".to_string()),
            configuration.price.map(format_price).unwrap_or_else(|| "price on request".to_string())
        );
    }
    Ok(())
}

/// Handle the 'search' command
async fn handle_search(service: &RecommendationService, query: &SearchQuery) -> Result<()> {
    let results = service.search(query).await;

    println!("{}", format!("{} matching listings:", results.len()).bold().blue());
    for property in &results {
        println!(
            "{}: {} [{} / {}] in {} from {}",
            property.id,
            property.title,
            property.property_type,
            property.collection,
            property.location,
            property.lowest_price().map(format_price).unwrap_or_else(|| "-".to_string())
        );
    }
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    service: &RecommendationService,
    store: &IndexStore,
    requests: usize,
    concurrent: usize,
) -> Result<()> {
    let ids = store.all_ids();
    if ids.is_empty() {
        return Err(anyhow!("No listings to benchmark against"));
    }

    let permits = Arc::new(Semaphore::new(concurrent.max(1)));
    let wall_clock = Instant::now();

    let mut handles = Vec::with_capacity(requests);
    for i in 0..requests {
        let id = ids[rand::random_range(0..ids.len())];
        let Some(current) = store.get(id) else {
            continue;
        };
        let service = service.clone();
        let permits = permits.clone();
        let user_id = format!("bench-user-{}", i % 10);

        handles.push(tokio::spawn(async move {
            let _permit = permits.acquire_owned().await?;
            let start = Instant::now();
            let response = service
                .get_similar_properties(&current, Some(user_id.as_str()), service.default_limit())
                .await;
            debug!("Request for {} served via {}", current.id, response.algorithm);
            Ok::<_, anyhow::Error>(start.elapsed())
        }));
    }

    let mut timings: Vec<Duration> = Vec::with_capacity(handles.len());
    for handle in handles {
        timings.push(handle.await??);
    }
    if timings.is_empty() {
        return Err(anyhow!("No requests completed"));
    }

    let total_time = wall_clock.elapsed();
    let latency_sum: Duration = timings.iter().sum();
    let avg_latency = latency_sum / timings.len() as u32;
    timings.sort();
    let percentile = |p: f64| timings[((timings.len() as f64 * p) as usize).min(timings.len() - 1)];
    let throughput = timings.len() as f64 / total_time.as_secs_f64();
    let stats = service.cache_stats();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Throughput: {:.2} requests/second", throughput);
    println!(
        "Cache: {} hits / {} misses ({:.1}% hit rate), {} entries",
        stats.hits,
        stats.misses,
        stats.hit_rate * 100.0,
        stats.size
    );
    Ok(())
}

fn format_price(price: f64) -> String {
    if price >= 10_000_000.0 {
        format!("₹{:.2} Cr", price / 10_000_000.0)
    } else if price >= 100_000.0 {
        format!("₹{:.2} L", price / 100_000.0)
    } else {
        format!("₹{:.0}", price)
    }
}

/// Helper function to format and print a similar-properties response
fn print_response(current: &Property, response: &SimilarPropertiesResponse, explain: bool) {
    println!(
        "{}",
        format!("Properties similar to {}:", current.title).bold().blue()
    );
    println!(
        "  algorithm: {}, cache hit: {}, candidates: {}, {:.2} ms",
        response.algorithm,
        response.cache_hit,
        response.metadata.total_candidates,
        response.metadata.processing_time
    );

    if response.is_empty() {
        println!("  {}", "No similar properties found".yellow());
        return;
    }

    for (rank, (property, score)) in response.properties.iter().zip(&response.scores).enumerate() {
        println!(
            "{}. {} [{} in {}] - Score: {:.2}",
            (rank + 1).to_string().green(),
            property.title,
            property.property_type,
            property.location,
            score.score()
        );
        if explain {
            let f = score.factors();
            println!(
                "   location {:.2} | type {:.2} | price {:.2} | size {:.2} | amenities {:.2} | collection {:.2} | developer {:.2}",
                f.location, f.property_type, f.price, f.size, f.amenities, f.collection, f.developer
            );
        }
    }

    if !response.personalized_scores.is_empty() {
        println!("{}", "Personalized ranking:".bold().blue());
        for (rank, rec) in response.personalized_scores.iter().enumerate() {
            println!(
                "{}. #{} - Score: {:.2} ({})",
                (rank + 1).to_string().green(),
                rec.property_id,
                rec.score,
                rec.reason
            );
            if explain {
                println!(
                    "   similarity {:.2} | preference {:.2} | behavior {:.2}",
                    rec.factors.similarity, rec.factors.preference, rec.factors.behavior
                );
            }
        }
    }
}
