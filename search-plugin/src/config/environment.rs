//! Environment-driven configuration for the server binary.

use std::env;

use serde_json::{Map, Value};
use tracing::info;

use crate::config::PluginOptions;

/// Default address the server binds to.
const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";

/// Settings read from the process environment.
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    /// Address the HTTP server listens on.
    pub bind_address: String,
    /// Plugin options document built from the `SEARCH_*` variables.
    pub options: Value,
}

impl EnvironmentConfig {
    /// Read settings from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `BIND_ADDRESS`: listen address (default: 0.0.0.0:3000)
    /// - `SEARCH_HOST`: single search node address
    /// - `SEARCH_HOSTS`: comma separated node addresses
    /// - `SEARCH_INDICES`: comma separated indices to provision
    /// - `SEARCH_HTTP_AUTH`: basic credentials, `user:password`
    /// - `SEARCH_REQUEST_TIMEOUT_MS`: request timeout in milliseconds
    /// - `SEARCH_API_VERSION`: API version tag
    ///
    /// Values are not validated here; they go through the same schema as any
    /// other options when the plugin registers.
    pub fn from_env() -> Self {
        let config = Self::from_lookup(|key| env::var(key).ok());

        info!(
            bind_address = %config.bind_address,
            "Loaded configuration from environment"
        );

        config
    }

    /// Build settings from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_address = lookup("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let mut configuration = Map::new();
        if let Some(host) = lookup("SEARCH_HOST") {
            configuration.insert("host".to_string(), Value::String(host));
        }
        if let Some(hosts) = lookup("SEARCH_HOSTS") {
            configuration.insert("hosts".to_string(), split_list(&hosts));
        }
        if let Some(auth) = lookup("SEARCH_HTTP_AUTH") {
            configuration.insert("httpAuth".to_string(), Value::String(auth));
        }
        if let Some(timeout) = lookup("SEARCH_REQUEST_TIMEOUT_MS") {
            // Unparseable numbers are kept as strings so validation reports them.
            let value = timeout
                .trim()
                .parse::<u64>()
                .map(Value::from)
                .unwrap_or(Value::String(timeout));
            configuration.insert("requestTimeout".to_string(), value);
        }
        if let Some(version) = lookup("SEARCH_API_VERSION") {
            configuration.insert("apiVersion".to_string(), Value::String(version));
        }

        let mut options = Map::new();
        if let Some(indices) = lookup("SEARCH_INDICES") {
            options.insert("indices".to_string(), split_list(&indices));
        }
        options.insert("configuration".to_string(), Value::Object(configuration));

        Self {
            bind_address,
            options: Value::Object(options),
        }
    }

    /// Plugin options for this environment.
    pub fn plugin_options(&self) -> PluginOptions {
        PluginOptions::from_value(self.options.clone())
    }
}

fn split_list(raw: &str) -> Value {
    Value::Array(
        raw.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| Value::String(item.to_string()))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::resolve;
    use serde_json::json;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_empty_environment() {
        let config = EnvironmentConfig::from_lookup(lookup(&[]));

        assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
        assert_eq!(config.options, json!({ "configuration": {} }));
        assert!(resolve(&config.options).is_ok());
    }

    #[test]
    fn test_full_environment() {
        let config = EnvironmentConfig::from_lookup(lookup(&[
            ("BIND_ADDRESS", "127.0.0.1:8080"),
            ("SEARCH_HOSTS", "a:9200, b:9200,"),
            ("SEARCH_INDICES", "test,another"),
            ("SEARCH_HTTP_AUTH", "user:pass"),
            ("SEARCH_REQUEST_TIMEOUT_MS", "2500"),
            ("SEARCH_API_VERSION", "7.x"),
        ]));

        assert_eq!(config.bind_address, "127.0.0.1:8080");
        assert_eq!(
            config.options,
            json!({
                "indices": ["test", "another"],
                "configuration": {
                    "hosts": ["a:9200", "b:9200"],
                    "httpAuth": "user:pass",
                    "requestTimeout": 2500,
                    "apiVersion": "7.x"
                }
            })
        );

        let settings = resolve(&config.options).unwrap();
        assert_eq!(settings.indices, vec!["test", "another"]);
    }

    #[test]
    fn test_bad_timeout_fails_validation() {
        let config = EnvironmentConfig::from_lookup(lookup(&[("SEARCH_REQUEST_TIMEOUT_MS", "soon")]));

        let err = resolve(&config.options).unwrap_err();
        assert_eq!(err.path(), Some("value.configuration.requestTimeout"));
    }

    #[test]
    fn test_host_and_hosts_from_environment_conflict() {
        let config = EnvironmentConfig::from_lookup(lookup(&[
            ("SEARCH_HOST", "a:9200"),
            ("SEARCH_HOSTS", "b:9200"),
        ]));

        assert!(resolve(&config.options).is_err());
    }
}
