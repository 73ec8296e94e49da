//! Error types for the search client plugin.

use search_plugin_repository::SearchIndexError;
use thiserror::Error;

use crate::config::ValidationError;

/// Errors that can occur while registering the plugin or starting the server.
#[derive(Error, Debug)]
pub enum PluginError {
    /// The merged options violate the schema. No client was built.
    #[error("Invalid search client configuration: {0}")]
    Configuration(#[from] ValidationError),

    /// The search client could not be constructed.
    #[error("Client construction error: {0}")]
    Construction(SearchIndexError),

    /// Ensuring an index during pre-start failed.
    #[error("Failed to provision index '{index}': {source}")]
    Provisioning {
        index: String,
        #[source]
        source: SearchIndexError,
    },

    /// A decoration with this name or value type already exists.
    #[error("Decoration '{0}' is already registered")]
    DuplicateDecoration(&'static str),

    /// The HTTP server failed.
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}

impl PluginError {
    /// Create a construction error.
    pub fn construction(source: SearchIndexError) -> Self {
        Self::Construction(source)
    }

    /// Create a provisioning error for `index`.
    pub fn provisioning(index: impl Into<String>, source: SearchIndexError) -> Self {
        Self::Provisioning {
            index: index.into(),
            source,
        }
    }
}
