//! Server crate for the property recommendation engine.
//!
//! This crate contains the `RecommendationService` that wires the property
//! store, similarity engine, cache and personalization together, plus the
//! response contract the rendering layer consumes.

pub mod config;
pub mod orchestrator;
pub mod response;

pub use config::ServiceConfig;
pub use orchestrator::RecommendationService;
pub use response::{Algorithm, ResponseMetadata, SimilarPropertiesResponse};
