//! Namespace Registry Module
//!
//! Maps logical resource names to their default TTL policy: long TTLs for
//! rarely-changing reference data, short TTLs for per-entity detail records,
//! very short TTLs for high-cardinality list results.

use std::collections::HashMap;
use std::time::Duration;

use crate::config::Config;

// == Namespace Registry ==
/// Per-namespace default TTLs with a fallback for unregistered namespaces.
#[derive(Debug, Clone)]
pub struct NamespaceRegistry {
    ttls: HashMap<String, Duration>,
    fallback: Duration,
}

impl NamespaceRegistry {
    /// Creates an empty registry with the given fallback TTL.
    pub fn new(fallback: Duration) -> Self {
        Self {
            ttls: HashMap::new(),
            fallback,
        }
    }

    /// Builds a registry from configuration.
    pub fn from_config(config: &Config) -> Self {
        let mut registry = Self::new(Duration::from_secs(config.default_ttl));
        for (namespace, seconds) in &config.namespace_ttls {
            registry.register(namespace.clone(), Duration::from_secs(*seconds));
        }
        registry
    }

    /// Registers (or replaces) the default TTL for a namespace.
    pub fn register(&mut self, namespace: impl Into<String>, ttl: Duration) {
        self.ttls.insert(namespace.into(), ttl);
    }

    /// Default TTL for a namespace, falling back for unknown ones.
    pub fn ttl_for(&self, namespace: &str) -> Duration {
        self.ttls.get(namespace).copied().unwrap_or(self.fallback)
    }
}
