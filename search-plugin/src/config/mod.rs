//! Configuration for the search client plugin.
//!
//! Caller options are merged over defaults, checked against a declarative
//! schema and only then decoded into typed settings. Validation happens
//! before any client is built or any request is sent.

pub mod environment;
pub mod merge;
pub mod options;
pub mod schema;

pub use environment::EnvironmentConfig;
pub use options::PluginOptions;
pub use schema::ValidationError;

use search_plugin_shared::PluginSettings;
use serde_json::Value;

/// Merge, validate and decode caller options.
///
/// # Returns
///
/// * `Ok(PluginSettings)` - The merged settings
/// * `Err(ValidationError)` - If the merged document violates the schema
pub fn resolve(options: &Value) -> Result<PluginSettings, ValidationError> {
    let merged = merge::merge_options(options);
    schema::validate(&merged)?;
    serde_json::from_value(merged).map_err(|e| ValidationError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use search_plugin_shared::{HostList, DEFAULT_HOST};
    use serde_json::json;

    #[test]
    fn test_resolve_defaults() {
        let settings = resolve(&json!({})).unwrap();
        assert_eq!(settings, PluginSettings::with_defaults());
    }

    #[test]
    fn test_resolve_typed_settings() {
        let settings = resolve(&json!({
            "indices": ["test", "another"],
            "configuration": { "hosts": ["a:9200", "b:9200"], "maxRetries": 5 }
        }))
        .unwrap();

        assert_eq!(settings.indices, vec!["test", "another"]);
        assert!(settings.configuration.host.is_none());
        assert!(matches!(settings.configuration.hosts, Some(HostList::Addresses(_))));
        assert_eq!(settings.configuration.max_retries, Some(5));
    }

    #[test]
    fn test_resolve_host_descriptor_with_auth() {
        let settings = resolve(&json!({
            "configuration": { "hosts": [{ "host": "a", "auth": "user:pass" }] }
        }))
        .unwrap();

        match settings.configuration.hosts {
            Some(HostList::Descriptors(hosts)) => {
                assert_eq!(hosts[0].auth.as_deref(), Some("user:pass"));
            }
            other => panic!("unexpected hosts {:?}", other),
        }
    }

    #[test]
    fn test_resolve_rejects_conflict() {
        let err = resolve(&json!({
            "configuration": { "host": DEFAULT_HOST, "hosts": ["b:9200"] }
        }))
        .unwrap_err();

        assert!(matches!(err, ValidationError::Conflict { .. }));
    }

    #[test]
    fn test_resolve_reports_decode_failures() {
        // Valid for the schema, but larger than the typed field.
        let err = resolve(&json!({ "configuration": { "maxRetries": 1u64 << 40 } })).unwrap_err();
        assert!(matches!(err, ValidationError::Decode(_)));
    }
}
