//! # Search Plugin Repository
//!
//! This crate provides the seam between the plugin and the search engine. It
//! includes definitions for errors, the index administration interface, the
//! typed client hooks, and a concrete implementation for OpenSearch.

pub mod errors;
pub mod hooks;
pub mod interfaces;
pub mod opensearch;

pub use errors::SearchIndexError;
pub use hooks::{ClientHooks, NodeSelector};
pub use interfaces::IndexProvider;
pub use opensearch::OpenSearchClient;
