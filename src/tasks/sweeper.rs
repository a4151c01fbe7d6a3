//! TTL Sweeper Task
//!
//! Background task that actively reclaims expired cache entries, so keys
//! that are written but never re-read do not accumulate.
//!
//! A single task drains the store's expiry min-heap instead of scheduling
//! one timer per key: it sleeps until the earliest pending deadline, capped
//! by an idle interval, and writers nudge it through a [`Notify`] whenever a
//! sooner deadline may have been installed.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Notify, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::cache::TtlStore;

/// Spawns the background sweeper for a shared store.
///
/// The task runs until aborted. Each pass takes the store write lock only
/// for the purge itself; the deadline lookup uses a read lock.
///
/// # Arguments
/// * `store` - Shared store to sweep
/// * `wakeup` - Notified by writers after installing a new expiry deadline
/// * `max_idle` - Longest the task sleeps when no deadline is pending
///
/// # Returns
/// A JoinHandle used to abort the task during teardown.
pub fn spawn_sweeper_task<V>(
    store: Arc<RwLock<TtlStore<V>>>,
    wakeup: Arc<Notify>,
    max_idle: Duration,
) -> JoinHandle<()>
where
    V: Send + Sync + 'static,
{
    tokio::spawn(async move {
        info!(max_idle_secs = max_idle.as_secs(), "starting TTL sweeper task");

        loop {
            let next_expiry = { store.read().await.next_expiry() };
            let cap = Instant::now() + max_idle;
            let deadline = match next_expiry {
                Some(at) => Instant::from_std(at).min(cap),
                None => cap,
            };

            tokio::select! {
                _ = tokio::time::sleep_until(deadline) => {}
                // a writer installed a deadline sooner than the one we
                // planned around; recompute on the next pass
                _ = wakeup.notified() => {}
            }

            let removed = { store.write().await.purge_expired() };
            if removed > 0 {
                info!(removed, "TTL sweep removed expired entries");
            } else {
                debug!("TTL sweep found nothing expired");
            }
        }
    })
}
