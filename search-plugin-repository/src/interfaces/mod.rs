//! Interface definitions for the search backend.
//!
//! This module defines the abstract `IndexProvider` trait that allows for
//! dependency injection and swappable search backend implementations.

mod index_provider;

pub use index_provider::IndexProvider;
