//! # Search Plugin
//!
//! Search client plugin for an axum host.
//!
//! Registering the plugin validates the caller's options, builds one
//! OpenSearch client for the server's lifetime and publishes it on the
//! server and on every request. Before the server accepts traffic, every
//! configured index that does not exist yet is created.

pub mod config;
pub mod errors;
pub mod plugin;
pub mod provision;
pub mod server;

#[cfg(test)]
mod testing;

pub use config::{EnvironmentConfig, PluginOptions, ValidationError};
pub use errors::PluginError;
pub use plugin::SearchPlugin;
pub use provision::{ensure_indices, ProvisionReport};
pub use server::{Phase, SearchClient, Server, SEARCH_CLIENT};
