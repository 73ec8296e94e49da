//! Index provider trait definition.
//!
//! This module defines the abstract interface for index administration,
//! allowing for different backend implementations (OpenSearch, in-memory
//! mocks, etc.).

use async_trait::async_trait;

use crate::errors::SearchIndexError;

/// Abstracts the index administration surface of a search backend.
///
/// The plugin only needs to know whether indices exist and how to create
/// them. Everything else the backend offers is reached through the concrete
/// client type.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`: one instance is shared by the
/// server and every request.
#[async_trait]
pub trait IndexProvider: Send + Sync {
    /// Check whether every index in `indices` exists.
    ///
    /// # Arguments
    ///
    /// * `indices` - Index names to check
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If all of the indices exist
    /// * `Ok(false)` - If at least one index is missing
    /// * `Err(SearchIndexError)` - If the check could not be performed
    async fn index_exists(&self, indices: &[&str]) -> Result<bool, SearchIndexError>;

    /// Create an index with the backend's default settings.
    ///
    /// Creating an index that already exists is an error.
    async fn create_index(&self, index: &str) -> Result<(), SearchIndexError>;

    /// Delete an index.
    ///
    /// If the index doesn't exist, the operation is considered successful.
    async fn delete_index(&self, index: &str) -> Result<(), SearchIndexError>;

    /// Check if the search engine is healthy and reachable.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the search engine is healthy
    /// * `Ok(false)` - If the search engine is unhealthy
    /// * `Err(SearchIndexError)` - If the health check fails to execute
    async fn health_check(&self) -> Result<bool, SearchIndexError>;
}
