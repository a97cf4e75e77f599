//! # Sources Crate
//!
//! Candidate retrieval against the property datastore.
//!
//! ## Components
//!
//! - **store**: the async `PropertyStore` collaborator trait and `IndexStore`,
//!   its in-process implementation over a shared `PropertyIndex`
//! - **tiers**: the four named query strategies, from type + location + price
//!   down to location only
//! - **retrieval**: `TieredRetriever`, which runs every tier concurrently and
//!   merges the rows by property id
//!
//! ## Example Usage
//!
//! ```ignore
//! use sources::{IndexStore, RetrievalConfig, TieredRetriever};
//! use std::sync::Arc;
//!
//! let store = Arc::new(IndexStore::new(index));
//! let retriever = TieredRetriever::new(store, RetrievalConfig::default());
//! let tiered = retriever.fetch_candidates(&current, 6).await;
//! ```

pub mod store;
pub mod tiers;
pub mod retrieval;

// Re-export commonly used types
pub use retrieval::{RetrievalConfig, TierOutcome, TieredCandidates, TieredRetriever, merge_tiers};
pub use store::{IndexStore, PropertyStore, StoreError};
pub use tiers::Tier;
