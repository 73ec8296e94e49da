//! Search index error types.
//!
//! This module defines the error types that can occur while building the
//! client or administering indices.

use thiserror::Error;

/// Errors that can occur during search backend operations.
#[derive(Debug, Clone, Error)]
pub enum SearchIndexError {
    /// The client options could not be turned into a transport.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Failed to reach the search engine.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The existence check for an index failed.
    #[error("Index existence check error: {0}")]
    IndexExistsError(String),

    /// Failed to create an index.
    #[error("Index creation error: {0}")]
    IndexCreationError(String),

    /// Failed to delete an index.
    #[error("Index deletion error: {0}")]
    IndexDeletionError(String),

    /// Failed to parse a response from the search engine.
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl SearchIndexError {
    /// Create a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::ConfigurationError(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create an index existence check error.
    pub fn index_exists(msg: impl Into<String>) -> Self {
        Self::IndexExistsError(msg.into())
    }

    /// Create an index creation error.
    pub fn index_creation(msg: impl Into<String>) -> Self {
        Self::IndexCreationError(msg.into())
    }

    /// Create an index deletion error.
    pub fn index_deletion(msg: impl Into<String>) -> Self {
        Self::IndexDeletionError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }
}
