//! Error types for the cache
//!
//! Provides unified error handling using thiserror.
//!
//! A cache miss is deliberately not represented here: misses are a normal
//! return signal (`Option::None`), and backing-store failures surfaced during
//! a fetch-on-miss belong to the fetcher's own error type.

use std::time::Duration;

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// TTL must be strictly positive
    #[error("invalid TTL {0:?}: must be strictly positive")]
    InvalidTtl(Duration),
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
