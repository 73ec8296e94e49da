//! Caller-facing registration options.

use search_plugin_repository::ClientHooks;
use serde_json::{Map, Value};

/// Options handed to `SearchPlugin::register`.
///
/// The document holds the `indices` list and the `configuration` object as
/// JSON so it can come straight from a config file; callback-valued options
/// travel separately in `hooks`.
///
/// # Example
///
/// ```ignore
/// let options = PluginOptions::new()
///     .indices(["articles", "authors"])
///     .configuration(json!({ "host": "search:9200", "requestTimeout": 5000 }));
/// let plugin = SearchPlugin::register(options)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct PluginOptions {
    document: Value,
    hooks: ClientHooks,
}

impl PluginOptions {
    /// Empty options: every default applies.
    pub fn new() -> Self {
        Self {
            document: Value::Object(Map::new()),
            hooks: ClientHooks::default(),
        }
    }

    /// Options from a complete JSON document, e.g. a parsed config file.
    pub fn from_value(document: Value) -> Self {
        Self {
            document,
            hooks: ClientHooks::default(),
        }
    }

    /// Set the indices to provision before start.
    pub fn indices<I, S>(mut self, indices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let indices: Vec<Value> = indices.into_iter().map(|s| Value::String(s.into())).collect();
        self.set("indices", Value::Array(indices));
        self
    }

    /// Set the client configuration object.
    pub fn configuration(mut self, configuration: Value) -> Self {
        self.set("configuration", configuration);
        self
    }

    /// Attach callback-valued client options.
    pub fn hooks(mut self, hooks: ClientHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// The raw options document.
    pub fn document(&self) -> &Value {
        &self.document
    }

    pub(crate) fn into_parts(self) -> (Value, ClientHooks) {
        (self.document, self.hooks)
    }

    fn set(&mut self, key: &str, value: Value) {
        if !self.document.is_object() {
            self.document = Value::Object(Map::new());
        }
        if let Value::Object(ref mut map) = self.document {
            map.insert(key.to_string(), value);
        }
    }
}
