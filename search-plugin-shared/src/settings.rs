//! Plugin settings: the index list plus the client configuration.

use serde::{Deserialize, Serialize};

use crate::configuration::ClientConfiguration;

/// Connection target used when the caller configures none.
pub const DEFAULT_HOST: &str = "localhost:9200";

/// Fully merged and validated plugin settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PluginSettings {
    /// Indices that must exist before the server accepts traffic, in the
    /// order they are provisioned. Duplicates are allowed.
    #[serde(default)]
    pub indices: Vec<String>,
    /// Options for the search client.
    #[serde(default)]
    pub configuration: ClientConfiguration,
}

impl PluginSettings {
    /// Settings with no indices and the default connection target.
    pub fn with_defaults() -> Self {
        Self {
            indices: Vec::new(),
            configuration: ClientConfiguration::with_host(DEFAULT_HOST),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::HostList;
    use serde_json::json;

    #[test]
    fn test_with_defaults() {
        let settings = PluginSettings::with_defaults();

        assert!(settings.indices.is_empty());
        assert_eq!(
            settings.configuration.host,
            Some(HostList::Address(DEFAULT_HOST.to_string()))
        );
    }

    #[test]
    fn test_deserialize_keeps_index_order_and_duplicates() {
        let settings: PluginSettings = serde_json::from_value(json!({
            "indices": ["b", "a", "b"],
            "configuration": { "host": "search:9200" }
        }))
        .unwrap();

        assert_eq!(settings.indices, vec!["b", "a", "b"]);
    }
}
