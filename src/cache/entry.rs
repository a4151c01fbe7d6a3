//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL metadata.

use std::time::{Duration, Instant};

/// Expiry cap for TTLs too large to add to an `Instant` (30 years).
const FAR_FUTURE: Duration = Duration::from_secs(60 * 60 * 24 * 365 * 30);

// == Cache Entry ==
/// A single cache entry: the stored value plus its expiry metadata.
///
/// The generation uniquely identifies one insertion of one key. Expiry
/// records in the sweep heap carry the generation they were scheduled for,
/// so a record that outlives its entry (the key was re-set, deleted, or
/// lazily expired) is recognized as inert instead of firing against a later
/// entry that reused the same key.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// When the entry was created
    pub created_at: Instant,
    /// How long the entry stays fresh
    pub ttl: Duration,
    /// Derived expiry instant (`created_at + ttl`)
    pub expires_at: Instant,
    /// Insertion counter, unique per (key, set) pair
    pub generation: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry expiring `ttl` from now.
    ///
    /// Any strictly positive TTL is valid; one too large to represent as an
    /// expiry instant saturates to a far-future deadline instead of
    /// overflowing.
    pub fn new(value: V, ttl: Duration, generation: u64) -> Self {
        let now = Instant::now();
        let expires_at = now.checked_add(ttl).unwrap_or(now + FAR_FUTURE);
        Self {
            value,
            created_at: now,
            ttl,
            expires_at,
            generation,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is expired when the current time is
    /// greater than or equal to the expiry instant, so a fully elapsed TTL
    /// means the entry is immediately stale.
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    // == Time To Live ==
    /// Returns the remaining TTL, saturating at zero once expired.
    ///
    /// Useful for debugging staleness and for operator tooling.
    pub fn ttl_remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }
}
