//! Plugin registration.
//!
//! `SearchPlugin::register` validates the options, builds the one client
//! handle for the server's lifetime and keeps what the pre-start hook needs.

use std::fmt;
use std::sync::Arc;

use tracing::{info, instrument};

use search_plugin_repository::hooks::ReadyHook;
use search_plugin_repository::{IndexProvider, OpenSearchClient};

use crate::config::{self, PluginOptions, ValidationError};
use crate::errors::PluginError;
use crate::provision::{self, ProvisionReport};

/// A registered search client plugin.
///
/// Holds the shared client handle. The server owns the plugin; requests
/// receive clones of the same `Arc`, never a second client.
pub struct SearchPlugin<C = OpenSearchClient> {
    client: Arc<C>,
    indices: Vec<String>,
    on_ready: Option<ReadyHook>,
}

impl SearchPlugin<OpenSearchClient> {
    /// Validate `options` and build the OpenSearch client.
    ///
    /// Fails before any client exists when the merged options violate the
    /// schema, and with `PluginError::Construction` when the client cannot
    /// be built from otherwise valid options.
    #[instrument(skip(options))]
    pub fn register(options: PluginOptions) -> Result<Self, PluginError> {
        let (document, hooks) = options.into_parts();
        let settings = config::resolve(&document)?;

        if settings.configuration.selector.is_some() && hooks.selector.is_some() {
            return Err(ValidationError::conflict("value.configuration", "selector", "selector hook").into());
        }

        let client = OpenSearchClient::from_configuration(&settings.configuration, &hooks)
            .map_err(PluginError::construction)?;

        for plugin in &hooks.plugins {
            plugin(&client);
        }

        info!(
            indices = ?settings.indices,
            nodes = client.nodes().len(),
            "Registered search client plugin"
        );

        let mut plugin = Self::with_client(settings.indices, Arc::new(client));
        plugin.on_ready = hooks.on_ready;
        Ok(plugin)
    }
}

impl<C> SearchPlugin<C>
where
    C: IndexProvider + 'static,
{
    /// Wrap an existing client handle.
    pub fn with_client(indices: Vec<String>, client: Arc<C>) -> Self {
        Self {
            client,
            indices,
            on_ready: None,
        }
    }

    /// Run `hook` after a successful pre-start.
    pub fn with_on_ready(mut self, hook: ReadyHook) -> Self {
        self.on_ready = Some(hook);
        self
    }

    /// The shared client handle.
    pub fn client(&self) -> Arc<C> {
        Arc::clone(&self.client)
    }

    /// Indices provisioned during pre-start.
    pub fn indices(&self) -> &[String] {
        &self.indices
    }

    /// Pre-start hook: ensure every configured index exists.
    ///
    /// Safe to run again after a restart; already existing indices are
    /// left alone.
    pub async fn on_pre_start(&self) -> Result<ProvisionReport, PluginError> {
        let report = provision::ensure_indices(self.client.as_ref(), &self.indices).await?;

        if let Some(ref on_ready) = self.on_ready {
            on_ready();
        }

        Ok(report)
    }
}

impl<C> fmt::Debug for SearchPlugin<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchPlugin")
            .field("indices", &self.indices)
            .field("on_ready", &self.on_ready.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockIndexProvider;
    use search_plugin_repository::ClientHooks;
    use search_plugin_shared::{HostList, DEFAULT_HOST};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_hooks(counter: &Arc<AtomicUsize>) -> ClientHooks {
        let counter = Arc::clone(counter);
        ClientHooks::new().with_plugin(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_register_with_defaults() {
        let plugin = SearchPlugin::register(PluginOptions::new()).unwrap();

        assert!(plugin.indices().is_empty());
        assert_eq!(
            plugin.client().configuration().host,
            Some(HostList::Address(DEFAULT_HOST.to_string()))
        );
        assert_eq!(plugin.client().nodes()[0].as_str(), "http://localhost:9200/");
    }

    #[test]
    fn test_client_handle_is_shared() {
        let plugin = SearchPlugin::register(PluginOptions::new()).unwrap();

        assert!(Arc::ptr_eq(&plugin.client(), &plugin.client()));
    }

    #[test]
    fn test_conflicting_hosts_build_no_client() {
        let constructed = Arc::new(AtomicUsize::new(0));
        let options = PluginOptions::new()
            .configuration(json!({ "host": "a:9200", "hosts": ["b:9200"] }))
            .hooks(counting_hooks(&constructed));

        let err = SearchPlugin::register(options).unwrap_err();

        assert!(matches!(err, PluginError::Configuration(ValidationError::Conflict { .. })));
        assert_eq!(constructed.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_plugins_run_once_on_construction() {
        let constructed = Arc::new(AtomicUsize::new(0));
        let options = PluginOptions::new().hooks(counting_hooks(&constructed));

        SearchPlugin::register(options).unwrap();

        assert_eq!(constructed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_invalid_options_message() {
        let err = SearchPlugin::register(PluginOptions::new().indices(Vec::<String>::new()).configuration(
            json!({ "apiVersion": "9.9" }),
        ))
        .unwrap_err();

        assert!(err
            .to_string()
            .starts_with("Invalid search client configuration: \"value.configuration.apiVersion\""));
    }

    #[test]
    fn test_selector_name_and_hook_conflict() {
        let options = PluginOptions::new()
            .configuration(json!({ "selector": "random" }))
            .hooks(ClientHooks::new().with_selector(|_| 0));

        let err = SearchPlugin::register(options).unwrap_err();
        assert!(matches!(err, PluginError::Configuration(ValidationError::Conflict { .. })));
    }

    #[test]
    fn test_construction_error() {
        let options = PluginOptions::new().configuration(json!({ "httpAuth": "missing-separator" }));

        let err = SearchPlugin::register(options).unwrap_err();
        assert!(matches!(err, PluginError::Construction(_)));
    }

    #[test]
    fn test_caller_document_is_copied() {
        let mut document = json!({
            "indices": ["test"],
            "configuration": { "host": "search:9200" }
        });

        let plugin = SearchPlugin::register(PluginOptions::from_value(document.clone())).unwrap();
        document["configuration"]["host"] = json!("elsewhere:9200");

        assert_eq!(
            plugin.client().configuration().host,
            Some(HostList::Address("search:9200".to_string()))
        );
        assert_eq!(plugin.indices(), ["test"]);
    }

    #[tokio::test]
    async fn test_pre_start_runs_on_ready_after_provisioning() {
        let client = Arc::new(MockIndexProvider::new());
        let readied = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&readied);

        let plugin = SearchPlugin::with_client(vec!["test".to_string()], Arc::clone(&client))
            .with_on_ready(Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }));

        let report = plugin.on_pre_start().await.unwrap();

        assert_eq!(report.created, vec!["test"]);
        assert_eq!(readied.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_on_ready_skipped_on_failure() {
        let client = Arc::new(MockIndexProvider::new().unreachable());
        let readied = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&readied);

        let plugin = SearchPlugin::with_client(vec!["test".to_string()], client).with_on_ready(Arc::new(
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
            },
        ));

        assert!(plugin.on_pre_start().await.is_err());
        assert_eq!(readied.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_pre_start_twice_is_idempotent() {
        let client = Arc::new(MockIndexProvider::with_indices(&["already"]));
        let plugin = SearchPlugin::with_client(
            vec!["test".to_string(), "already".to_string()],
            Arc::clone(&client),
        );

        plugin.on_pre_start().await.unwrap();
        let second = plugin.on_pre_start().await.unwrap();

        assert!(second.created.is_empty());
        assert_eq!(client.create_calls(), 1);
    }
}
