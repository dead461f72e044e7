//! Background expiry sweep for the in-process token store
//!
//! The sweeper is an owned task: it starts when the store is built and stops
//! when the store is shut down or its last handle is dropped.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::domain::entities::token::StoredEntry;

/// Entries shared between the store and its sweeper
pub(crate) type EntryMap = Arc<RwLock<HashMap<String, StoredEntry>>>;

/// Result of one sweep
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepResult {
    /// Number of expired entries evicted
    pub removed: usize,
    /// Number of entries left after the sweep
    pub remaining: usize,
}

/// Evict every entry already expired when the sweep starts.
///
/// `now` is read once and the whole pass runs under one write lock, so an
/// entry saved while the sweep waits for the lock is judged against the same
/// instant and readers never see a half-evicted state.
pub(crate) async fn sweep_entries(entries: &RwLock<HashMap<String, StoredEntry>>) -> SweepResult {
    let now = Utc::now();
    let mut guard = entries.write().await;
    let before = guard.len();

    guard.retain(|_, entry| !entry.is_expired_at(now));

    SweepResult {
        removed: before - guard.len(),
        remaining: guard.len(),
    }
}

/// Handle owning the sweeper task
pub(crate) struct SweeperHandle {
    shutdown_tx: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SweeperHandle {
    /// Spawn the sweeper on the current Tokio runtime
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime.
    pub(crate) fn spawn(entries: EntryMap, interval: Duration) -> Self {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            info!(
                "Token sweeper started - will run every {}ms",
                interval.as_millis()
            );

            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let result = sweep_entries(&entries).await;
                        if result.removed > 0 {
                            debug!(
                                "Swept {} expired tokens, {} remaining",
                                result.removed, result.remaining
                            );
                        }
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            debug!("Token sweeper stopped");
        });

        Self {
            shutdown_tx,
            task: Mutex::new(Some(task)),
        }
    }

    /// Signal the task to stop and wait for it to finish
    pub(crate) async fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
        let task = self.task.lock().await.take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!("Token sweeper task ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
    }
}
