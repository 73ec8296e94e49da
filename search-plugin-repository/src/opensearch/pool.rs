//! Multi-node connection pool with a pluggable node selector.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use opensearch::http::transport::{Connection, ConnectionPool};
use rand::Rng;
use url::Url;

use crate::errors::SearchIndexError;
use crate::hooks::NodeSelector;

/// Connection pool over a fixed node list.
///
/// Each request asks the selector for the next node. Clones share the
/// round-robin cursor.
#[derive(Clone)]
pub struct SelectorConnectionPool {
    nodes: Arc<[Url]>,
    selector: NodeSelector,
    cursor: Arc<AtomicUsize>,
}

impl SelectorConnectionPool {
    /// Create a pool over `nodes`. The list must not be empty.
    pub fn new(nodes: Vec<Url>, selector: NodeSelector) -> Result<Self, SearchIndexError> {
        if nodes.is_empty() {
            return Err(SearchIndexError::configuration(
                "A connection pool needs at least one node",
            ));
        }

        Ok(Self {
            nodes: nodes.into(),
            selector,
            cursor: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// The nodes this pool distributes requests over.
    pub fn nodes(&self) -> &[Url] {
        &self.nodes
    }

    /// The node the next request goes to.
    pub fn next_node(&self) -> &Url {
        let len = self.nodes.len();
        let index = match &self.selector {
            NodeSelector::RoundRobin => self.cursor.fetch_add(1, Ordering::Relaxed),
            NodeSelector::Random => rand::thread_rng().gen_range(0..len),
            // Out of range picks wrap instead of panicking.
            NodeSelector::Custom(select) => select(&self.nodes),
        };
        &self.nodes[index % len]
    }
}

impl fmt::Debug for SelectorConnectionPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectorConnectionPool")
            .field("nodes", &self.nodes)
            .field("selector", &self.selector)
            .finish()
    }
}

impl ConnectionPool for SelectorConnectionPool {
    fn next(&self) -> Connection {
        Connection::new(self.next_node().clone())
    }
}
