//! OpenSearch implementation of the search backend.
//!
//! This module provides a concrete implementation of `IndexProvider`
//! using OpenSearch as the backend.

mod client;
pub mod hosts;
mod pool;

pub use client::OpenSearchClient;
pub use pool::SelectorConnectionPool;
