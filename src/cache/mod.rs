//! Cache Module
//!
//! In-memory key-value caching with TTL expiration, deterministic key
//! construction, and prefix-based bulk invalidation.

mod entry;
mod keys;
mod namespace;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::CacheEntry;
pub use keys::{KeyBuilder, resource_prefix};
pub use namespace::NamespaceRegistry;
pub use stats::{CacheStats, OccupancySnapshot};
pub use store::TtlStore;
