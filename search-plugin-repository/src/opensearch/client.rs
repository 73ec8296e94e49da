//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `IndexProvider`
//! using the OpenSearch Rust client, and builds its transport from a
//! `ClientConfiguration`.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use opensearch::{
    auth::{ClientCertificate, Credentials},
    cert::{Certificate, CertificateValidation},
    cluster::ClusterHealthParts,
    http::headers::{HeaderMap, HeaderName, HeaderValue},
    http::transport::{ConnectionPool, SingleNodeConnectionPool, Transport, TransportBuilder},
    indices::{IndicesCreateParts, IndicesDeleteParts, IndicesExistsParts},
    OpenSearch,
};
use search_plugin_shared::{ClientConfiguration, TlsSettings};
use serde_json::Value;
use tracing::{debug, error, info, instrument};
use url::Url;

use crate::errors::SearchIndexError;
use crate::hooks::{ClientHooks, NodeSelector};
use crate::interfaces::IndexProvider;
use crate::opensearch::hosts;
use crate::opensearch::pool::SelectorConnectionPool;

/// OpenSearch client implementation.
///
/// Wraps the raw `OpenSearch` client together with the configuration it was
/// built from. The full client API stays reachable through [`inner`].
///
/// # Example
///
/// ```ignore
/// let configuration = ClientConfiguration::with_host("localhost:9200");
/// let client = OpenSearchClient::from_configuration(&configuration, &ClientHooks::new())?;
///
/// if !client.index_exists(&["articles"]).await? {
///     client.create_index("articles").await?;
/// }
/// ```
///
/// [`inner`]: OpenSearchClient::inner
#[derive(Debug, Clone)]
pub struct OpenSearchClient {
    client: OpenSearch,
    configuration: ClientConfiguration,
    nodes: Vec<Url>,
}

impl OpenSearchClient {
    /// Create a client connected to a single node.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server address (e.g., "http://localhost:9200")
    pub fn new(url: &str) -> Result<Self, SearchIndexError> {
        Self::from_configuration(&ClientConfiguration::with_host(url), &ClientHooks::new())
    }

    /// Build a client from validated options and hooks.
    ///
    /// A single node gets a `SingleNodeConnectionPool`; several nodes share a
    /// `SelectorConnectionPool` driven by the configured selector.
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchClient)` - A new client instance
    /// * `Err(SearchIndexError)` - If the options cannot be turned into a transport
    pub fn from_configuration(
        configuration: &ClientConfiguration,
        hooks: &ClientHooks,
    ) -> Result<Self, SearchIndexError> {
        let mut nodes = hosts::resolve_hosts(configuration)?;
        if let Some(ref transform) = hooks.nodes_to_host_callback {
            nodes = transform(nodes);
        }
        if nodes.is_empty() {
            return Err(SearchIndexError::configuration("No search hosts configured"));
        }

        let headers = default_headers(configuration, hooks)?;

        let transport = if nodes.len() == 1 {
            build_transport(
                SingleNodeConnectionPool::new(nodes[0].clone()),
                configuration,
                headers,
            )?
        } else {
            let selector = NodeSelector::resolve(configuration.selector, hooks.selector.as_ref());
            build_transport(
                SelectorConnectionPool::new(nodes.clone(), selector)?,
                configuration,
                headers,
            )?
        };

        let unapplied = configuration.unapplied_options();
        if !unapplied.is_empty() {
            debug!(options = ?unapplied, "Options without a transport equivalent are retained only");
        }

        info!(
            nodes = nodes.len(),
            first_node = %nodes[0],
            "Created OpenSearch client"
        );

        Ok(Self {
            client: OpenSearch::new(transport),
            configuration: configuration.clone(),
            nodes,
        })
    }

    /// The raw OpenSearch client, exposing the full API surface.
    pub fn inner(&self) -> &OpenSearch {
        &self.client
    }

    /// The configuration this client was built from.
    pub fn configuration(&self) -> &ClientConfiguration {
        &self.configuration
    }

    /// The nodes this client talks to.
    pub fn nodes(&self) -> &[Url] {
        &self.nodes
    }
}

fn build_transport<P>(
    pool: P,
    configuration: &ClientConfiguration,
    headers: HeaderMap,
) -> Result<Transport, SearchIndexError>
where
    P: ConnectionPool + fmt::Debug + Clone + Send + 'static,
{
    let mut builder = TransportBuilder::new(pool).disable_proxy();

    if let Some(credentials) = credentials(configuration)? {
        builder = builder.auth(credentials);
    }
    if let Some(timeout) = configuration.request_timeout {
        builder = builder.timeout(Duration::from_millis(timeout));
    }
    if let Some(validation) = certificate_validation(configuration.ssl.as_ref())? {
        builder = builder.cert_validation(validation);
    }
    for (name, value) in headers.iter() {
        builder = builder.header(name.clone(), value.clone());
    }

    builder
        .build()
        .map_err(|e| SearchIndexError::connection(e.to_string()))
}

/// Transport credentials: `httpAuth`, else the `auth` of a host entry, or a
/// PKCS#12 client certificate. The transport takes a single credential.
fn credentials(configuration: &ClientConfiguration) -> Result<Option<Credentials>, SearchIndexError> {
    let basic = configuration
        .http_auth
        .as_deref()
        .or_else(|| hosts::descriptor_auth(configuration));
    let certificate = client_certificate(configuration.ssl.as_ref())?;

    match (basic, certificate) {
        (Some(_), Some(_)) => Err(SearchIndexError::configuration(
            "Basic credentials and ssl.pfx cannot be combined",
        )),
        (Some(auth), None) => basic_credentials(auth).map(Some),
        (None, Some(certificate)) => Ok(Some(Credentials::Certificate(certificate))),
        (None, None) => Ok(None),
    }
}

/// Decode a base64 PKCS#12 bundle from `ssl.pfx`, unlocked by `ssl.passphrase`.
fn client_certificate(ssl: Option<&TlsSettings>) -> Result<Option<ClientCertificate>, SearchIndexError> {
    let Some(pfx) = ssl.and_then(|ssl| ssl.pfx.as_ref()) else {
        return Ok(None);
    };

    let bundles = pfx.to_vec();
    let bundle = match bundles.as_slice() {
        [] => return Ok(None),
        [bundle] => bundle,
        _ => {
            return Err(SearchIndexError::configuration(
                "ssl.pfx accepts a single PKCS#12 bundle",
            ))
        }
    };

    let bytes = STANDARD
        .decode(bundle.trim())
        .map_err(|e| SearchIndexError::configuration(format!("ssl.pfx is not valid base64: {}", e)))?;
    let passphrase = ssl.and_then(|ssl| ssl.passphrase.clone());

    Ok(Some(ClientCertificate::Pkcs12(bytes, passphrase)))
}

/// Split `user:password` into basic credentials.
fn basic_credentials(auth: &str) -> Result<Credentials, SearchIndexError> {
    let (user, password) = auth
        .split_once(':')
        .ok_or_else(|| SearchIndexError::configuration("httpAuth must be in the form user:password"))?;
    Ok(Credentials::Basic(user.to_string(), password.to_string()))
}

fn certificate_validation(
    ssl: Option<&TlsSettings>,
) -> Result<Option<CertificateValidation>, SearchIndexError> {
    let Some(ssl) = ssl else {
        return Ok(None);
    };

    if ssl.reject_unauthorized == Some(false) {
        return Ok(Some(CertificateValidation::None));
    }

    match ssl.ca {
        Some(ref ca) => {
            let bundle = ca.to_vec().join("\n");
            let certificate = Certificate::from_pem(bundle.as_bytes()).map_err(|e| {
                SearchIndexError::configuration(format!("Invalid CA certificate: {}", e))
            })?;
            Ok(Some(CertificateValidation::Full(certificate)))
        }
        None => Ok(None),
    }
}

/// Headers from the node agent factory and from structured host entries.
fn default_headers(
    configuration: &ClientConfiguration,
    hooks: &ClientHooks,
) -> Result<HeaderMap, SearchIndexError> {
    let mut headers = match hooks.create_node_agent {
        Some(ref factory) => factory(configuration),
        None => HeaderMap::new(),
    };

    for (name, value) in hosts::descriptor_headers(configuration) {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| SearchIndexError::configuration(format!("Invalid header '{}': {}", name, e)))?;
        let value = HeaderValue::from_str(&value)
            .map_err(|e| SearchIndexError::configuration(format!("Invalid header value: {}", e)))?;
        headers.insert(name, value);
    }

    Ok(headers)
}

#[async_trait]
impl IndexProvider for OpenSearchClient {
    #[instrument(skip(self))]
    async fn index_exists(&self, indices: &[&str]) -> Result<bool, SearchIndexError> {
        if indices.is_empty() {
            return Ok(true);
        }

        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(indices))
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        match response.status_code().as_u16() {
            200 => Ok(true),
            404 => Ok(false),
            status => {
                let error_body = response.text().await.unwrap_or_default();
                error!(status = status, body = %error_body, "Index existence check failed");
                Err(SearchIndexError::index_exists(format!(
                    "Existence check failed with status {}: {}",
                    status, error_body
                )))
            }
        }
    }

    #[instrument(skip(self))]
    async fn create_index(&self, index: &str) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(index))
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Create index request failed");
            return Err(SearchIndexError::index_creation(format!(
                "Creating '{}' failed with status {}: {}",
                index, status, error_body
            )));
        }

        info!(index = %index, "Created index");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_index(&self, index: &str) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .indices()
            .delete(IndicesDeleteParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let status = response.status_code();

        // 404 is acceptable - index may not exist
        if !status.is_success() && status.as_u16() != 404 {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Delete index request failed");
            return Err(SearchIndexError::index_deletion(format!(
                "Deleting '{}' failed with status {}: {}",
                index, status, error_body
            )));
        }

        debug!(index = %index, "Index deleted");
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, SearchIndexError> {
        let response = self
            .client
            .cluster()
            .health(ClusterHealthParts::None)
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        if !response.status_code().is_success() {
            return Ok(false);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))?;

        Ok(matches!(body["status"].as_str(), Some("green") | Some("yellow")))
    }
}
