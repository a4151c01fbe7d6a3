//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with TTL expiration and
//! prefix-based bulk invalidation.
//!
//! Expiry is enforced twice over: lazily on read, so a stale value is never
//! observed regardless of sweeper precision, and actively by the background
//! sweeper, which drains an expiry min-heap so entries that are written but
//! never re-read still get reclaimed.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::time::{Duration, Instant};

use chrono::Utc;

use crate::cache::{CacheEntry, CacheStats, OccupancySnapshot};
use crate::error::{CacheError, Result};

// == Expiry Record ==
/// A pending expiry in the sweep heap, ordered by deadline.
///
/// The generation ties the record to one specific insertion; a record whose
/// generation no longer matches the live entry is inert and is discarded
/// when it surfaces. That mismatch check is what "cancels" the pending
/// expiry of an entry that was re-set, deleted, or lazily expired.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct ExpiryRecord {
    expires_at: Instant,
    generation: u64,
    key: String,
}

// == TTL Store ==
/// Generic key-value store with per-entry expiration.
///
/// Purely synchronous; callers wrap it in `Arc<RwLock<_>>` (the service
/// does) to serialize mutations. All mutating paths are idempotent under
/// races: an expiry firing against an already-replaced entry is a no-op.
#[derive(Debug)]
pub struct TtlStore<V> {
    /// Key-value storage; at most one live entry per key
    entries: HashMap<String, CacheEntry<V>>,
    /// Min-heap of pending expiries, drained by the sweeper
    expiry_heap: BinaryHeap<Reverse<ExpiryRecord>>,
    /// Insertion counter backing entry generations
    next_generation: u64,
    /// Bumped by every set/delete/invalidate/clear; in-flight fetches that
    /// started under an older epoch must not insert their result
    write_epoch: u64,
    /// Hit/miss/expiry counters
    stats: CacheStats,
}

impl<V> Default for TtlStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> TtlStore<V> {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            expiry_heap: BinaryHeap::new(),
            next_generation: 0,
            write_epoch: 0,
            stats: CacheStats::new(),
        }
    }

    // == Set ==
    /// Stores a key-value pair with the given TTL.
    ///
    /// Overwrites any existing entry; the replaced entry's pending expiry
    /// becomes inert through the generation check. Fails with
    /// [`CacheError::InvalidTtl`] when `ttl` is not strictly positive.
    pub fn set(&mut self, key: impl Into<String>, value: V, ttl: Duration) -> Result<()> {
        if ttl.is_zero() {
            return Err(CacheError::InvalidTtl(ttl));
        }

        let key = key.into();
        let generation = self.next_generation;
        self.next_generation += 1;

        let entry = CacheEntry::new(value, ttl, generation);
        self.expiry_heap.push(Reverse(ExpiryRecord {
            expires_at: entry.expires_at,
            generation,
            key: key.clone(),
        }));
        self.entries.insert(key, entry);

        self.write_epoch += 1;
        self.stats.set_total_entries(self.entries.len());
        Ok(())
    }

    // == Delete ==
    /// Removes an entry by key; idempotent on a missing key.
    ///
    /// Returns whether an entry was actually removed. The epoch is bumped
    /// either way: deleting a key that is being computed right now must
    /// still prevent the in-flight result from being inserted.
    pub fn delete(&mut self, key: &str) -> bool {
        self.write_epoch += 1;
        if self.entries.remove(key).is_some() {
            self.stats.set_total_entries(self.entries.len());
            true
        } else {
            false
        }
    }

    // == Clear ==
    /// Removes all entries and every pending expiry record.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.expiry_heap.clear();
        self.write_epoch += 1;
        self.stats.set_total_entries(0);
    }

    // == Invalidate ==
    /// Removes every live key starting with `prefix`.
    ///
    /// Returns the number of entries removed; zero matches is a no-op, not
    /// an error. Runs to completion before returning, so a caller that
    /// invalidates synchronously after a backing-store write gets
    /// read-after-write consistency.
    pub fn invalidate_prefix(&mut self, prefix: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.starts_with(prefix));
        let removed = before - self.entries.len();

        self.write_epoch += 1;
        if removed > 0 {
            self.stats.record_invalidated(removed as u64);
            self.stats.set_total_entries(self.entries.len());
        }
        removed
    }

    // == Purge Expired ==
    /// Drains every due record from the expiry heap, removing entries whose
    /// generation still matches. Inert records (entry re-set, deleted, or
    /// already lazily expired) are discarded without touching the map, which
    /// makes concurrent firing against the same key exactly-once.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&mut self) -> usize {
        let now = Instant::now();
        let mut removed = 0;

        loop {
            match self.expiry_heap.peek() {
                Some(Reverse(record)) if record.expires_at <= now => {}
                _ => break,
            }
            let Some(Reverse(record)) = self.expiry_heap.pop() else {
                break;
            };

            let live = self
                .entries
                .get(&record.key)
                .map_or(false, |entry| entry.generation == record.generation);
            if live {
                self.entries.remove(&record.key);
                self.stats.record_expired();
                removed += 1;
            }
        }

        if removed > 0 {
            self.stats.set_total_entries(self.entries.len());
        }
        removed
    }

    // == Next Expiry ==
    /// Deadline of the earliest pending expiry record, if any.
    ///
    /// May point at an inert record; that only wakes the sweeper early,
    /// which is harmless.
    pub fn next_expiry(&self) -> Option<Instant> {
        self.expiry_heap
            .peek()
            .map(|Reverse(record)| record.expires_at)
    }

    // == Write Epoch ==
    /// Current mutation epoch, captured by fetch-on-miss before computing.
    pub fn write_epoch(&self) -> u64 {
        self.write_epoch
    }

    // == Occupancy ==
    /// Read-only snapshot of live keys, optionally scoped by prefix.
    ///
    /// Entries that have expired but not yet been swept are filtered out of
    /// the listing without being removed; this method never mutates.
    pub fn occupancy(&self, prefix: Option<&str>) -> OccupancySnapshot {
        let mut keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(key, entry)| {
                !entry.is_expired() && prefix.map_or(true, |p| key.starts_with(p))
            })
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();

        OccupancySnapshot {
            captured_at: Utc::now(),
            entries: keys.len(),
            keys,
        }
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Length ==
    /// Returns the current number of entries, counting expired-but-unswept ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Clone> TtlStore<V> {
    // == Get ==
    /// Retrieves a value by key.
    ///
    /// An entry whose expiry has passed is purged before the miss is
    /// returned, so a stale value is never observed; the purge also makes
    /// the entry's pending heap record inert, so it cannot later fire
    /// against a different entry that reused the key.
    ///
    /// Lazy expiry does not bump the write epoch: it changes no observable
    /// value, only reclaims one that was already unobservable.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let expired = match self.entries.get(key) {
            Some(entry) => {
                if !entry.is_expired() {
                    let value = entry.value.clone();
                    self.stats.record_hit();
                    return Some(value);
                }
                true
            }
            None => false,
        };

        if expired {
            self.entries.remove(key);
            self.stats.record_expired();
            self.stats.set_total_entries(self.entries.len());
        }
        self.stats.record_miss();
        None
    }
}
