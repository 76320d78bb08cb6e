//! Live registry of outgoing endpoints, keyed by address prefix.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::endpoint::Endpoint;

/// Concurrency-safe map from address prefix to endpoint.
///
/// Handlers read it while routing is in flight, so lookups can race with
/// attach/detach. A miss is a normal outcome, not an error.
#[derive(Default)]
pub struct EndpointRegistry {
    endpoints: DashMap<String, Arc<dyn Endpoint>>,
}

impl EndpointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `endpoint` under its own prefix. Returns the endpoint it
    /// displaced, if the prefix was already taken.
    pub fn attach(&self, endpoint: Arc<dyn Endpoint>) -> Option<Arc<dyn Endpoint>> {
        let prefix = endpoint.prefix().to_string();
        let displaced = self.endpoints.insert(prefix.clone(), endpoint);
        debug!(prefix = %prefix, displaced = displaced.is_some(), "Endpoint attached");
        displaced
    }

    /// Remove and return the endpoint registered under `prefix`.
    pub fn detach(&self, prefix: &str) -> Option<Arc<dyn Endpoint>> {
        let removed = self.endpoints.remove(prefix).map(|(_, endpoint)| endpoint);
        debug!(prefix = %prefix, found = removed.is_some(), "Endpoint detached");
        removed
    }

    pub fn lookup(&self, prefix: &str) -> Option<Arc<dyn Endpoint>> {
        self.endpoints.get(prefix).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Snapshot of the registered prefixes.
    pub fn prefixes(&self) -> Vec<String> {
        self.endpoints
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }
}

impl fmt::Debug for EndpointRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointRegistry")
            .field("len", &self.endpoints.len())
            .finish()
    }
}
