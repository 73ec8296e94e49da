//! Connection target resolution.
//!
//! Turns the `host` / `hosts` option into node URLs. Addresses without a
//! scheme are treated as `http`, and addresses without a port use 9200.

use std::collections::BTreeMap;

use search_plugin_shared::{ClientConfiguration, HostDescriptor, HostList};
use url::Url;

use crate::errors::SearchIndexError;

/// Port used when an address does not carry one.
pub const DEFAULT_PORT: u16 = 9200;

const DEFAULT_PROTOCOL: &str = "http";

/// Resolve the configured connection targets into node URLs.
///
/// Returns an empty list when neither `host` nor `hosts` is set.
pub fn resolve_hosts(configuration: &ClientConfiguration) -> Result<Vec<Url>, SearchIndexError> {
    match configuration.targets() {
        None => Ok(Vec::new()),
        Some(HostList::Address(address)) => Ok(vec![parse_address(address)?]),
        Some(HostList::Addresses(addresses)) => addresses.iter().map(|a| parse_address(a)).collect(),
        Some(HostList::Descriptors(descriptors)) => {
            descriptors.iter().map(descriptor_url).collect()
        }
    }
}

/// Headers declared on structured host entries, merged in declaration order.
pub fn descriptor_headers(configuration: &ClientConfiguration) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();
    if let Some(HostList::Descriptors(descriptors)) = configuration.targets() {
        for descriptor in descriptors {
            if let Some(ref declared) = descriptor.headers {
                headers.extend(declared.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }
    }
    headers
}

/// Basic credentials from the first structured host entry that declares them.
pub fn descriptor_auth(configuration: &ClientConfiguration) -> Option<&str> {
    match configuration.targets() {
        Some(HostList::Descriptors(descriptors)) => {
            descriptors.iter().find_map(|d| d.auth.as_deref())
        }
        _ => None,
    }
}

/// Parse a `host[:port][/path]` or `scheme://host[:port][/path]` address.
pub fn parse_address(address: &str) -> Result<Url, SearchIndexError> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(SearchIndexError::configuration("Empty host address"));
    }

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("{}://{}", DEFAULT_PROTOCOL, trimmed)
    };

    let mut url = Url::parse(&with_scheme).map_err(|e| {
        SearchIndexError::configuration(format!("Invalid host address '{}': {}", address, e))
    })?;

    if !has_explicit_port(&with_scheme) {
        url.set_port(Some(DEFAULT_PORT)).map_err(|_| {
            SearchIndexError::configuration(format!("Host address '{}' cannot carry a port", address))
        })?;
    }

    Ok(url)
}

fn descriptor_url(descriptor: &HostDescriptor) -> Result<Url, SearchIndexError> {
    let protocol = descriptor.protocol.as_deref().unwrap_or(DEFAULT_PROTOCOL);
    let port = descriptor.port.unwrap_or(DEFAULT_PORT);
    let path = descriptor.path.as_deref().unwrap_or("/");
    let separator = if path.starts_with('/') { "" } else { "/" };

    let raw = format!("{}://{}:{}{}{}", protocol, descriptor.host, port, separator, path);
    Url::parse(&raw).map_err(|e| {
        SearchIndexError::configuration(format!("Invalid host descriptor '{}': {}", descriptor.host, e))
    })
}

/// Whether the authority part of `address` (which has a scheme) names a port.
///
/// `Url::port()` reports `None` for a scheme's default port, so an explicit
/// `:80` or `:443` can only be told apart from a missing port in the text.
fn has_explicit_port(address: &str) -> bool {
    let rest = match address.split_once("://") {
        Some((_, rest)) => rest,
        None => address,
    };
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority.rsplit('@').next().unwrap_or_default();

    // Bracketed IPv6 literals contain colons of their own.
    let after_host = match host_port.rfind(']') {
        Some(end) => &host_port[end + 1..],
        None => host_port,
    };
    after_host.contains(':')
}
