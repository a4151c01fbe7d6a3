//! Cache Service
//!
//! The process-wide cache object: constructed once at startup, passed by
//! reference to every consumer. Owns the store, the in-flight fetch table,
//! and the background sweeper, with an explicit init/teardown lifecycle.
//!
//! # Locking discipline
//! All store mutations happen under one write lock, so readers never see a
//! torn write or a partially-invalidated prefix. The expensive fetch-on-miss
//! step runs with no lock held; only the metadata mutation around it is
//! locked, so one slow backing-store call cannot serialize unrelated cache
//! traffic.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex, Notify, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{CacheStats, NamespaceRegistry, OccupancySnapshot, TtlStore};
use crate::config::Config;
use crate::error::Result;
use crate::tasks::spawn_sweeper_task;

// == Flight ==
/// State of one in-flight fetch, broadcast to coalesced waiters.
#[derive(Debug, Clone)]
enum Flight<V> {
    Pending,
    Done(V),
    Failed,
}

/// Role a caller takes for a cold key: first one in leads the fetch,
/// everyone else waits on its channel.
enum Role<V> {
    Leader(watch::Sender<Flight<V>>),
    Waiter(watch::Receiver<Flight<V>>),
}

// == Cache Service ==
/// Thread-safe cache service with TTL expiry, prefix invalidation, and
/// coalesced fetch-on-miss.
///
/// The value type is fixed per instance; an application holding
/// heterogeneous cached types runs one service per type (or serializes at
/// the boundary).
pub struct CacheService<V> {
    /// Shared store, also held by the sweeper task
    store: Arc<RwLock<TtlStore<V>>>,
    /// One record per key currently being fetched
    in_flight: Mutex<HashMap<String, watch::Receiver<Flight<V>>>>,
    /// Nudges the sweeper when a writer installs a sooner deadline
    wakeup: Arc<Notify>,
    /// Per-namespace default TTLs
    namespaces: NamespaceRegistry,
    /// Background sweeper, aborted on shutdown/drop
    sweeper: JoinHandle<()>,
}

impl<V> CacheService<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates the service and starts its background sweeper.
    pub fn new(config: &Config) -> Self {
        let store = Arc::new(RwLock::new(TtlStore::new()));
        let wakeup = Arc::new(Notify::new());
        let sweeper = spawn_sweeper_task(
            store.clone(),
            wakeup.clone(),
            Duration::from_secs(config.sweep_idle_secs),
        );
        info!("cache service initialized");

        Self {
            store,
            in_flight: Mutex::new(HashMap::new()),
            wakeup,
            namespaces: NamespaceRegistry::from_config(config),
            sweeper,
        }
    }

    // == Get ==
    /// Retrieves a value by key; an expired entry is purged and missed.
    ///
    /// Takes the write lock: a read may lazily purge and always moves the
    /// hit/miss counters.
    pub async fn get(&self, key: &str) -> Option<V> {
        self.store.write().await.get(key)
    }

    // == Set ==
    /// Stores a value under a key with the given TTL.
    pub async fn set(&self, key: impl Into<String>, value: V, ttl: Duration) -> Result<()> {
        self.store.write().await.set(key, value, ttl)?;
        // the new entry may carry the earliest deadline
        self.wakeup.notify_one();
        Ok(())
    }

    // == Delete ==
    /// Removes a key; idempotent, returns whether an entry existed.
    pub async fn delete(&self, key: &str) -> bool {
        self.store.write().await.delete(key)
    }

    // == Clear ==
    /// Drops every entry and every pending expiry.
    pub async fn clear(&self) {
        self.store.write().await.clear();
        debug!("cache cleared");
    }

    // == Invalidate ==
    /// Removes every live key starting with `prefix`; returns the count.
    ///
    /// Completes under the store write lock before returning, so a backing
    /// store that invalidates synchronously after a successful write, before
    /// acknowledging it, gets read-after-write consistency.
    pub async fn invalidate(&self, prefix: &str) -> usize {
        let removed = self.store.write().await.invalidate_prefix(prefix);
        if removed > 0 {
            debug!(prefix, removed, "invalidated cached entries");
        }
        removed
    }

    // == Stats ==
    /// Snapshot of the performance counters.
    pub async fn stats(&self) -> CacheStats {
        self.store.read().await.stats()
    }

    // == Occupancy ==
    /// Read-only listing of live keys, optionally scoped by prefix.
    pub async fn occupancy(&self, prefix: Option<&str>) -> OccupancySnapshot {
        self.store.read().await.occupancy(prefix)
    }

    // == Namespace TTL ==
    /// Default TTL for a namespace per the configured policy.
    pub fn ttl_for(&self, namespace: &str) -> Duration {
        self.namespaces.ttl_for(namespace)
    }

    // == Get Or Fetch ==
    /// Returns the cached value, or computes it via `fetch` and caches it.
    ///
    /// Concurrent misses on one key share a single backing computation: the
    /// first caller fetches, the rest wait and receive the same value.
    /// Fetch errors propagate unmodified and are never cached; if the
    /// leading fetch fails, each waiter falls back to its own fetch so the
    /// leader's error cannot decide someone else's outcome.
    pub async fn get_or_fetch<F, Fut, E>(
        &self,
        key: &str,
        ttl: Duration,
        fetch: F,
    ) -> std::result::Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<V, E>>,
    {
        if let Some(value) = self.get(key).await {
            return Ok(value);
        }

        let role = {
            let mut in_flight = self.in_flight.lock().await;
            match in_flight.get(key) {
                Some(rx) => Role::Waiter(rx.clone()),
                None => {
                    let (tx, rx) = watch::channel(Flight::Pending);
                    in_flight.insert(key.to_string(), rx);
                    Role::Leader(tx)
                }
            }
        };

        match role {
            Role::Leader(tx) => {
                let result = self.fetch_and_store(key, ttl, fetch).await;
                // unregister before settling so a miss racing the broadcast
                // starts a fresh flight instead of joining a finished one
                self.in_flight.lock().await.remove(key);
                match &result {
                    Ok(value) => {
                        let _ = tx.send(Flight::Done(value.clone()));
                    }
                    Err(_) => {
                        let _ = tx.send(Flight::Failed);
                    }
                }
                result
            }
            Role::Waiter(mut rx) => {
                loop {
                    {
                        let flight = rx.borrow_and_update();
                        match &*flight {
                            Flight::Done(value) => return Ok(value.clone()),
                            Flight::Failed => break,
                            Flight::Pending => {}
                        }
                    }
                    if rx.changed().await.is_err() {
                        // leader vanished without settling (cancelled task);
                        // drop the dead record so later misses coalesce again
                        let mut in_flight = self.in_flight.lock().await;
                        if in_flight
                            .get(key)
                            .map_or(false, |current| current.same_channel(&rx))
                        {
                            in_flight.remove(key);
                        }
                        break;
                    }
                }
                // the flight failed or vanished, but another caller may have
                // populated the key in the meantime; recheck before issuing
                // a redundant backing fetch
                if let Some(value) = self.get(key).await {
                    return Ok(value);
                }
                self.fetch_and_store(key, ttl, fetch).await
            }
        }
    }

    /// Fetches with no lock held, then inserts only if the store has not
    /// been written since the miss was observed.
    async fn fetch_and_store<F, Fut, E>(
        &self,
        key: &str,
        ttl: Duration,
        fetch: F,
    ) -> std::result::Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<V, E>>,
    {
        let epoch = { self.store.read().await.write_epoch() };

        let value = fetch().await?;

        let mut store = self.store.write().await;
        if store.write_epoch() == epoch {
            match store.set(key, value.clone(), ttl) {
                Ok(()) => {
                    drop(store);
                    self.wakeup.notify_one();
                }
                Err(err) => {
                    // best-effort acceleration: an uncacheable TTL degrades
                    // to a plain fetch
                    warn!(key, %err, "fetched value not cached");
                }
            }
        } else {
            // a delete, invalidation, or newer set raced the fetch; the
            // caller still gets the value, but inserting it would resurrect
            // state the writer just removed
            debug!(key, "discarding insert for superseded fetch");
        }
        Ok(value)
    }

    // == Shutdown ==
    /// Explicit teardown: stops the sweeper and drops every entry and
    /// pending expiry. The service afterwards degrades to always-miss
    /// without breaking callers.
    pub async fn shutdown(&self) {
        self.sweeper.abort();
        self.store.write().await.clear();
        info!("cache service shut down");
    }
}

impl<V> Drop for CacheService<V> {
    fn drop(&mut self) {
        self.sweeper.abort();
    }
}
