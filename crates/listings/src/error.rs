//! Error types for the listings crate.

use thiserror::Error;

use crate::types::PropertyId;

/// Errors that can occur while loading, parsing or validating property listings
#[derive(Error, Debug)]
pub enum ListingError {
    /// I/O error occurred while reading a listings file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The listings file is not valid JSON or does not match the property shape
    #[error("Failed to parse listings: {0}")]
    ParseError(#[from] serde_json::Error),

    /// A field had a value outside its domain
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Two listings share the same slug
    #[error("Duplicate slug '{slug}' on properties {first} and {second}")]
    DuplicateSlug {
        slug: String,
        first: PropertyId,
        second: PropertyId,
    },

    /// A listing failed a consistency check
    #[error("Validation failed for property {id}: {reason}")]
    ValidationError { id: PropertyId, reason: String },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, ListingError>;
