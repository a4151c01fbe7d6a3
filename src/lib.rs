//! querycache - In-process TTL cache with prefix invalidation
//!
//! Hides slow backing-store queries (aggregate statistics, reference data,
//! per-entity detail records) behind low-latency in-memory reads.
//!
//! A read builds a key with [`KeyBuilder`], tries the cache, and on a miss
//! computes the value through [`CacheService::get_or_fetch`], which caches
//! it with a TTL. A backing-store write calls [`CacheService::invalidate`]
//! with the affected [`resource_prefix`] before acknowledging, so subsequent
//! reads miss and recompute. Expired entries are purged both lazily on read
//! and actively by a background sweeper task.
//!
//! The cache is strictly best-effort acceleration: after [`CacheService::clear`]
//! or a restart every read misses and recomputes, with no correctness impact
//! on callers.

pub mod cache;
pub mod config;
pub mod error;
pub mod service;
pub mod tasks;

pub use cache::{
    CacheEntry, CacheStats, KeyBuilder, NamespaceRegistry, OccupancySnapshot, TtlStore,
    resource_prefix,
};
pub use config::Config;
pub use error::CacheError;
pub use service::CacheService;
pub use tasks::spawn_sweeper_task;
