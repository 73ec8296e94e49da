//! Typed client hooks.
//!
//! Callback-valued options cannot be expressed in a configuration document,
//! so they are attached to the plugin through `ClientHooks` instead.

use std::fmt;
use std::sync::Arc;

use opensearch::http::headers::HeaderMap;
use search_plugin_shared::{ClientConfiguration, SelectorName};
use url::Url;

use crate::opensearch::OpenSearchClient;

/// Extension invoked once with the freshly constructed client.
pub type ClientPlugin = Arc<dyn Fn(&OpenSearchClient) + Send + Sync>;

/// Picks the index of the node to use for the next request.
pub type SelectorFn = Arc<dyn Fn(&[Url]) -> usize + Send + Sync>;

/// Invoked once the client is ready, after index provisioning has succeeded.
///
/// The legacy client's `defer` option overrides its promise factory. Futures
/// need no such override, so that key is not accepted and this hook is the
/// only readiness callback.
pub type ReadyHook = Arc<dyn Fn() + Send + Sync>;

/// Rewrites the resolved node list before the connection pool is built.
pub type HostTransform = Arc<dyn Fn(Vec<Url>) -> Vec<Url> + Send + Sync>;

/// Produces default headers for every node connection.
pub type NodeAgentFactory = Arc<dyn Fn(&ClientConfiguration) -> HeaderMap + Send + Sync>;

/// Callback-valued client options.
#[derive(Clone, Default)]
pub struct ClientHooks {
    pub plugins: Vec<ClientPlugin>,
    pub selector: Option<SelectorFn>,
    pub on_ready: Option<ReadyHook>,
    pub nodes_to_host_callback: Option<HostTransform>,
    pub create_node_agent: Option<NodeAgentFactory>,
}

impl ClientHooks {
    /// Create an empty set of hooks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a client extension.
    pub fn with_plugin(mut self, plugin: impl Fn(&OpenSearchClient) + Send + Sync + 'static) -> Self {
        self.plugins.push(Arc::new(plugin));
        self
    }

    /// Use a custom node selection strategy.
    pub fn with_selector(
        mut self,
        selector: impl Fn(&[Url]) -> usize + Send + Sync + 'static,
    ) -> Self {
        self.selector = Some(Arc::new(selector));
        self
    }

    /// Run `hook` once the client is ready.
    pub fn with_on_ready(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_ready = Some(Arc::new(hook));
        self
    }

    /// Rewrite the node list before connecting.
    pub fn with_nodes_to_host_callback(
        mut self,
        callback: impl Fn(Vec<Url>) -> Vec<Url> + Send + Sync + 'static,
    ) -> Self {
        self.nodes_to_host_callback = Some(Arc::new(callback));
        self
    }

    /// Provide default headers for node connections.
    pub fn with_create_node_agent(
        mut self,
        factory: impl Fn(&ClientConfiguration) -> HeaderMap + Send + Sync + 'static,
    ) -> Self {
        self.create_node_agent = Some(Arc::new(factory));
        self
    }
}

impl fmt::Debug for ClientHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientHooks")
            .field("plugins", &self.plugins.len())
            .field("selector", &self.selector.is_some())
            .field("on_ready", &self.on_ready.is_some())
            .field("nodes_to_host_callback", &self.nodes_to_host_callback.is_some())
            .field("create_node_agent", &self.create_node_agent.is_some())
            .finish()
    }
}

/// Node selection strategy used by multi-node connection pools.
#[derive(Clone)]
pub enum NodeSelector {
    RoundRobin,
    Random,
    Custom(SelectorFn),
}

impl NodeSelector {
    /// Resolve the strategy from the configured name and the custom hook.
    ///
    /// The caller is expected to have rejected configurations that set both.
    pub fn resolve(name: Option<SelectorName>, custom: Option<&SelectorFn>) -> Self {
        match (custom, name) {
            (Some(selector), _) => Self::Custom(selector.clone()),
            (None, Some(SelectorName::Random)) => Self::Random,
            (None, Some(SelectorName::RoundRobin)) | (None, None) => Self::RoundRobin,
        }
    }
}

impl Default for NodeSelector {
    fn default() -> Self {
        Self::RoundRobin
    }
}

impl fmt::Debug for NodeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RoundRobin => f.write_str("RoundRobin"),
            Self::Random => f.write_str("Random"),
            Self::Custom(_) => f.write_str("Custom"),
        }
    }
}
