//! # Listings Crate
//!
//! Property data model and the in-memory property datastore.
//!
//! ## Main Components
//!
//! - **types**: `Property` and its nested records (configurations, images, developer)
//! - **query**: `PropertyQuery` / `SearchQuery` / `PriceRange`, the datastore query surface
//! - **index**: `PropertyIndex`, primary and secondary indices for fast filtered reads
//! - **loader**: load and validate a JSON export of the property collection
//! - **error**: error types for loading and validation
//!
//! ## Example Usage
//!
//! ```ignore
//! use listings::{PropertyIndex, PropertyQuery, PropertyType};
//! use std::path::Path;
//!
//! let index = PropertyIndex::load_from_file(Path::new("data/properties.json"))?;
//! let current = index.get_by_slug("palm-grove").unwrap();
//!
//! let query = PropertyQuery::new(18)
//!     .with_type(current.property_type)
//!     .with_location(&current.location)
//!     .excluding(current.id);
//! let neighbours = index.query(&query);
//! ```

pub mod error;
pub mod types;
pub mod query;
pub mod index;
pub mod loader;

pub use error::{ListingError, Result};
pub use index::PropertyIndex;
pub use query::{PriceRange, PropertyQuery, SearchQuery};
pub use types::{
    // Type aliases
    PropertyId,
    DeveloperId,
    // Core types
    Property,
    Configuration,
    Image,
    Developer,
    // Enums
    PropertyType,
    Collection,
    ListingStatus,
    normalize_location,
};
