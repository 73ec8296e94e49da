//! Error types for the search plugin repository.

mod search_index_error;

pub use search_index_error::SearchIndexError;
