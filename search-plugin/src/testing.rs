//! Test doubles shared by the unit tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use search_plugin_repository::{IndexProvider, SearchIndexError};

/// In-memory index backend that counts calls.
#[derive(Default)]
pub struct MockIndexProvider {
    indices: Mutex<HashSet<String>>,
    exists_calls: AtomicUsize,
    create_calls: AtomicUsize,
    failing_create: Option<String>,
    unreachable: bool,
}

impl MockIndexProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_indices(indices: &[&str]) -> Self {
        Self {
            indices: Mutex::new(indices.iter().map(|s| s.to_string()).collect()),
            ..Self::default()
        }
    }

    /// Make `create_index` fail for `index`.
    pub fn failing_create(mut self, index: &str) -> Self {
        self.failing_create = Some(index.to_string());
        self
    }

    /// Make every call fail as if the backend were down.
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    pub fn exists_calls(&self) -> usize {
        self.exists_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IndexProvider for MockIndexProvider {
    async fn index_exists(&self, indices: &[&str]) -> Result<bool, SearchIndexError> {
        self.exists_calls.fetch_add(1, Ordering::SeqCst);
        if self.unreachable {
            return Err(SearchIndexError::connection("Mock backend unreachable"));
        }
        let existing = self.indices.lock().await;
        Ok(indices.iter().all(|index| existing.contains(*index)))
    }

    async fn create_index(&self, index: &str) -> Result<(), SearchIndexError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.unreachable {
            return Err(SearchIndexError::connection("Mock backend unreachable"));
        }
        if self.failing_create.as_deref() == Some(index) {
            return Err(SearchIndexError::index_creation("Mock failure"));
        }
        if !self.indices.lock().await.insert(index.to_string()) {
            return Err(SearchIndexError::index_creation(format!(
                "resource_already_exists_exception: {}",
                index
            )));
        }
        Ok(())
    }

    async fn delete_index(&self, index: &str) -> Result<(), SearchIndexError> {
        self.indices.lock().await.remove(index);
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, SearchIndexError> {
        Ok(!self.unreachable)
    }
}
