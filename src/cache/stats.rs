//! Cache Statistics Module
//!
//! Tracks cache performance metrics and provides read-only occupancy
//! snapshots for operator tooling and staleness debugging.

use chrono::{DateTime, Utc};
use serde::Serialize;

// == Cache Stats ==
/// Tracks cache performance metrics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key absent or expired)
    pub misses: u64,
    /// Number of entries removed because their TTL elapsed
    pub expired: u64,
    /// Number of entries removed by prefix invalidation
    pub invalidated: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Expired ==
    /// Increments the expiry counter.
    pub fn record_expired(&mut self) {
        self.expired += 1;
    }

    // == Record Invalidated ==
    /// Adds to the invalidation counter.
    pub fn record_invalidated(&mut self, count: u64) {
        self.invalidated += count;
    }

    // == Update Entry Count ==
    /// Updates the total entries count.
    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}

// == Occupancy Snapshot ==
/// Point-in-time listing of live keys, produced without mutating the store.
#[derive(Debug, Clone, Serialize)]
pub struct OccupancySnapshot {
    /// When the snapshot was taken
    pub captured_at: DateTime<Utc>,
    /// Number of live (unexpired) entries in scope
    pub entries: usize,
    /// Sorted live keys in scope
    pub keys: Vec<String>,
}
