//! Deterministic cache keys for each recommendation domain.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use listings::{PropertyId, SearchQuery};

pub const PROPERTY_PREFIX: &str = "property:";
pub const SIMILAR_PREFIX: &str = "similar:";
pub const PREFERENCES_PREFIX: &str = "prefs:";
pub const SEARCH_PREFIX: &str = "search:";

pub fn property_key(slug: &str) -> String {
    format!("{PROPERTY_PREFIX}{slug}")
}

pub fn similar_key(property_id: PropertyId) -> String {
    format!("{SIMILAR_PREFIX}{property_id}")
}

pub fn preferences_key(user_id: &str) -> String {
    format!("{PREFERENCES_PREFIX}{user_id}")
}

/// `search:` followed by the base64 of the query's JSON form
pub fn search_key(query: &SearchQuery) -> String {
    let encoded = match serde_json::to_vec(query) {
        Ok(json) => STANDARD.encode(json),
        Err(_) => STANDARD.encode(format!("{:?}", query)),
    };
    format!("{SEARCH_PREFIX}{encoded}")
}
