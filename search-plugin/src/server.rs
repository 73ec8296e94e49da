//! Minimal axum host with a pre-start phase.
//!
//! `Server` wraps a `Router` and adds the two things the plugin needs from
//! its host: decorations published on the server and on every request, and
//! pre-start hooks that complete before the listener accepts a connection.

use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{Extensions, Request, StatusCode};
use axum::response::Response;
use axum::routing::MethodRouter;
use axum::{Extension, Router};
use futures::future::BoxFuture;
use tokio::net::TcpListener;
use tower::ServiceExt;
use tracing::{info, instrument};

use search_plugin_repository::IndexProvider;

use crate::errors::PluginError;
use crate::plugin::SearchPlugin;

/// Name under which the search client is published.
pub const SEARCH_CLIENT: &str = "search";

type PreStartHook = Arc<dyn Fn() -> BoxFuture<'static, Result<(), PluginError>> + Send + Sync>;
type RequestLayer = Arc<dyn Fn(Router) -> Router + Send + Sync>;

/// Lifecycle phase of a `Server`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Plugins and routes may still be added.
    Registering,
    /// Pre-start hooks have completed.
    Initialized,
}

/// HTTP server that runs pre-start hooks before accepting traffic.
pub struct Server {
    router: Router,
    decorations: Extensions,
    decoration_names: HashSet<&'static str>,
    request_layers: Vec<RequestLayer>,
    pre_start: Vec<PreStartHook>,
    phase: Phase,
}

impl Server {
    /// Create a server around `router`.
    pub fn new(router: Router) -> Self {
        Self {
            router,
            decorations: Extensions::new(),
            decoration_names: HashSet::new(),
            request_layers: Vec::new(),
            pre_start: Vec::new(),
            phase: Phase::Registering,
        }
    }

    /// Add a route.
    pub fn route(&mut self, path: &str, method_router: MethodRouter) -> &mut Self {
        self.router = std::mem::take(&mut self.router).route(path, method_router);
        self
    }

    /// Publish `value` on the server and on every request under `name`.
    ///
    /// Requests see a clone of `value`; for an `Arc` that is the same
    /// instance the server holds. Lookups go by type, so both the name and
    /// the type must be new.
    pub fn decorate<T>(&mut self, name: &'static str, value: T) -> Result<(), PluginError>
    where
        T: Clone + Send + Sync + 'static,
    {
        if self.decoration_names.contains(name) || self.decorations.get::<T>().is_some() {
            return Err(PluginError::DuplicateDecoration(name));
        }
        self.decoration_names.insert(name);

        self.decorations.insert(value.clone());
        self.request_layers
            .push(Arc::new(move |router: Router| router.layer(Extension(value.clone()))));
        Ok(())
    }

    /// A server-scoped decoration, looked up by type.
    pub fn decoration<T>(&self) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.decorations.get::<T>().cloned()
    }

    /// Add a hook that runs during `initialize`, in registration order.
    pub fn ext_pre_start<F, Fut>(&mut self, hook: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), PluginError>> + Send + 'static,
    {
        self.pre_start.push(Arc::new(move || Box::pin(hook())));
    }

    /// Register a search client plugin.
    ///
    /// Publishes the client handle on the server and request scopes and
    /// schedules index provisioning for pre-start.
    pub fn register<C>(&mut self, plugin: SearchPlugin<C>) -> Result<(), PluginError>
    where
        C: IndexProvider + 'static,
    {
        self.decorate(SEARCH_CLIENT, plugin.client())?;

        let plugin = Arc::new(plugin);
        self.ext_pre_start(move || {
            let plugin = Arc::clone(&plugin);
            async move { plugin.on_pre_start().await.map(|_| ()) }
        });

        Ok(())
    }

    /// The server-scoped search client.
    pub fn search_client<C>(&self) -> Option<Arc<C>>
    where
        C: Send + Sync + 'static,
    {
        self.decoration::<Arc<C>>()
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Run every pre-start hook once.
    ///
    /// The first failing hook aborts initialization and the server stays in
    /// `Phase::Registering`. Calling this again after success is a no-op.
    #[instrument(skip(self), fields(hooks = self.pre_start.len()))]
    pub async fn initialize(&mut self) -> Result<(), PluginError> {
        if self.phase == Phase::Initialized {
            return Ok(());
        }

        for hook in &self.pre_start {
            hook().await?;
        }

        self.phase = Phase::Initialized;
        info!("Server initialized");
        Ok(())
    }

    /// Send one request through the routes without a socket.
    pub async fn inject(&self, request: Request<Body>) -> Response {
        match self.app().oneshot(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        }
    }

    /// Initialize, then serve on `listener` until the process ends.
    pub async fn serve(self, listener: TcpListener) -> Result<(), PluginError> {
        self.serve_with_shutdown(listener, std::future::pending()).await
    }

    /// Initialize, then serve on `listener` until `signal` resolves.
    ///
    /// No connection is accepted before every pre-start hook succeeded.
    pub async fn serve_with_shutdown<F>(
        mut self,
        listener: TcpListener,
        signal: F,
    ) -> Result<(), PluginError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.initialize().await?;

        let address = listener.local_addr()?;
        info!(address = %address, "Server listening");

        axum::serve(listener, self.app())
            .with_graceful_shutdown(signal)
            .await?;

        info!("Server stopped");
        Ok(())
    }

    fn app(&self) -> Router {
        self.request_layers
            .iter()
            .fold(self.router.clone(), |router, layer| layer(router))
    }
}

impl fmt::Debug for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Server")
            .field("decorations", &self.decoration_names)
            .field("pre_start", &self.pre_start.len())
            .field("phase", &self.phase)
            .finish()
    }
}

/// Request-scoped access to the search client.
///
/// ```ignore
/// async fn handler(SearchClient(client): SearchClient<OpenSearchClient>) -> StatusCode {
///     match client.health_check().await {
///         Ok(true) => StatusCode::OK,
///         _ => StatusCode::SERVICE_UNAVAILABLE,
///     }
/// }
/// ```
pub struct SearchClient<C>(pub Arc<C>);

#[async_trait]
impl<S, C> FromRequestParts<S> for SearchClient<C>
where
    S: Send + Sync,
    C: Send + Sync + 'static,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Arc<C>>()
            .cloned()
            .map(SearchClient)
            .ok_or((
                StatusCode::INTERNAL_SERVER_ERROR,
                "search client plugin is not registered",
            ))
    }
}
