//! The property datastore collaborator.
//!
//! Retrieval only needs read access through [`PropertyStore`]; the
//! in-process [`IndexStore`] serves a shared `PropertyIndex`.

use std::sync::Arc;

use async_trait::async_trait;
use listings::{Property, PropertyId, PropertyIndex, PropertyQuery, SearchQuery};
use parking_lot::RwLock;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("query failed: {0}")]
    QueryFailed(String),

    #[error("property store unavailable")]
    Unavailable,
}

/// Read-only query surface of the property collection.
///
/// `Send + Sync` so one store can serve concurrent tier queries.
#[async_trait]
pub trait PropertyStore: Send + Sync {
    /// Name of the backend, for logging
    fn name(&self) -> &str;

    async fn find_properties(&self, query: &PropertyQuery) -> Result<Vec<Arc<Property>>, StoreError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Arc<Property>>, StoreError>;

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Arc<Property>>, StoreError>;
}

/// Store backed by an in-memory [`PropertyIndex`]
#[derive(Clone, Default)]
pub struct IndexStore {
    index: Arc<RwLock<PropertyIndex>>,
}

impl IndexStore {
    pub fn new(index: PropertyIndex) -> Self {
        Self {
            index: Arc::new(RwLock::new(index)),
        }
    }

    /// Insert or replace a listing, returning the previous record
    pub fn upsert(&self, property: Property) -> Option<Arc<Property>> {
        self.index.write().insert_property(property)
    }

    pub fn remove(&self, id: PropertyId) -> Option<Arc<Property>> {
        self.index.write().remove_property(id)
    }

    pub fn get(&self, id: PropertyId) -> Option<Arc<Property>> {
        self.index.read().get_property(id).cloned()
    }

    /// Ids of every stored listing, ascending
    pub fn all_ids(&self) -> Vec<PropertyId> {
        self.index.read().all_ids()
    }

    pub fn len(&self) -> usize {
        self.index.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.read().is_empty()
    }
}

#[async_trait]
impl PropertyStore for IndexStore {
    fn name(&self) -> &str {
        "index"
    }

    async fn find_properties(&self, query: &PropertyQuery) -> Result<Vec<Arc<Property>>, StoreError> {
        Ok(self.index.read().query(query))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Arc<Property>>, StoreError> {
        Ok(self.index.read().get_by_slug(slug).cloned())
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Arc<Property>>, StoreError> {
        Ok(self.index.read().search(query))
    }
}
