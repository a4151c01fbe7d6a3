//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Fallback TTL in seconds for namespaces without a registered policy
    pub default_ttl: u64,
    /// Longest the sweeper sleeps when no expiry deadline is pending, in seconds
    pub sweep_idle_secs: u64,
    /// Per-namespace default TTLs in seconds
    pub namespace_ttls: Vec<(String, u64)>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DEFAULT_TTL` - Fallback TTL in seconds (default: 300)
    /// - `SWEEP_IDLE_SECS` - Sweeper idle cap in seconds (default: 1)
    /// - `NAMESPACE_TTLS` - Comma-separated `namespace=seconds` pairs,
    ///   e.g. `student=30,program=600` (default: empty)
    pub fn from_env() -> Self {
        Self {
            default_ttl: env::var("DEFAULT_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
            sweep_idle_secs: env::var("SWEEP_IDLE_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1),
            namespace_ttls: env::var("NAMESPACE_TTLS")
                .map(|v| parse_namespace_ttls(&v))
                .unwrap_or_default(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl: 300,
            sweep_idle_secs: 1,
            namespace_ttls: Vec::new(),
        }
    }
}

/// Parses a `namespace=seconds,namespace=seconds` list, skipping malformed pairs.
fn parse_namespace_ttls(raw: &str) -> Vec<(String, u64)> {
    raw.split(',')
        .filter_map(|pair| {
            let (namespace, seconds) = pair.split_once('=')?;
            let namespace = namespace.trim();
            if namespace.is_empty() {
                return None;
            }
            Some((namespace.to_string(), seconds.trim().parse().ok()?))
        })
        .collect()
}
