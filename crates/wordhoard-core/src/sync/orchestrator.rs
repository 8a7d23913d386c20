//! Drain coordination and the shared sync status surface.
//!
//! One orchestrator owns the queue, the backend, and the [`SyncStatus`]
//! snapshot the UI polls. Drains run at most one at a time; a trigger that
//! arrives while a cycle is in flight is dropped, since the running cycle
//! already covers its items. Enqueues go through the same queue lock, so a
//! drain never overwrites an item added mid-cycle.

use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::backend::RemoteBackend;
use super::queue::SyncQueue;
use super::types::{DrainReport, Mutation, QueueItem, SyncError, SyncStatus};

/// How long the success indicator stays visible after a cycle that
/// uploaded something.
pub const DEFAULT_SUCCESS_WINDOW: Duration = Duration::from_secs(2);

/// Coordinates queue drains and exposes sync state to the UI.
///
/// Cheap to clone; clones share the queue, backend, and status.
#[derive(Clone)]
pub struct SyncOrchestrator {
    queue: Arc<AsyncMutex<SyncQueue>>,
    backend: Arc<dyn RemoteBackend>,
    status: Arc<RwLock<SyncStatus>>,
    /// Held for the duration of a drain cycle; `try_lock` failures mean a
    /// cycle is already running.
    drain_gate: Arc<AsyncMutex<()>>,
    hide_success: Arc<Mutex<Option<JoinHandle<()>>>>,
    success_window: Duration,
}

impl SyncOrchestrator {
    pub fn new(queue: SyncQueue, backend: Arc<dyn RemoteBackend>) -> Self {
        let status = SyncStatus {
            pending_count: queue.pending_count(),
            ..SyncStatus::default()
        };
        Self {
            queue: Arc::new(AsyncMutex::new(queue)),
            backend,
            status: Arc::new(RwLock::new(status)),
            drain_gate: Arc::new(AsyncMutex::new(())),
            hide_success: Arc::new(Mutex::new(None)),
            success_window: DEFAULT_SUCCESS_WINDOW,
        }
    }

    /// Override how long the success indicator lingers.
    pub fn with_success_window(mut self, window: Duration) -> Self {
        self.success_window = window;
        self
    }

    /// Snapshot of the current sync state.
    pub fn status(&self) -> SyncStatus {
        self.status.read().unwrap().clone()
    }

    /// Queue a mutation for upload. Waits if a drain currently holds the
    /// queue.
    pub async fn enqueue(&self, mutation: &Mutation) -> Result<QueueItem, SyncError> {
        let (item, count) = {
            let mut queue = self.queue.lock().await;
            let item = queue.enqueue(mutation)?;
            (item, queue.pending_count())
        };
        self.status.write().unwrap().pending_count = count;
        Ok(item)
    }

    /// Record a connectivity change. Coming back online starts a drain;
    /// every other transition only updates the flag.
    pub async fn set_online(&self, online: bool) -> Option<DrainReport> {
        let was_online = {
            let mut status = self.status.write().unwrap();
            std::mem::replace(&mut status.online, online)
        };
        if online && !was_online {
            self.run_drain("reconnected").await
        } else {
            None
        }
    }

    /// The app returned to the foreground; flush anything queued while it
    /// was backgrounded.
    pub async fn notify_foregrounded(&self) -> Option<DrainReport> {
        self.run_drain("foregrounded").await
    }

    /// Explicit user-requested sync.
    pub async fn sync_now(&self) -> Option<DrainReport> {
        self.run_drain("requested").await
    }

    /// Items that exhausted their retries.
    pub async fn failed_items(&self) -> Vec<QueueItem> {
        self.queue.lock().await.failed()
    }

    /// Give quarantined items another chance. Returns how many moved back
    /// to the pending queue.
    pub async fn retry_failed(&self) -> usize {
        let (count, pending) = {
            let mut queue = self.queue.lock().await;
            let count = queue.retry_failed();
            (count, queue.pending_count())
        };
        self.status.write().unwrap().pending_count = pending;
        count
    }

    /// Run one drain cycle, or return `None` when a cycle is already in
    /// flight.
    async fn run_drain(&self, trigger: &str) -> Option<DrainReport> {
        let Ok(_gate) = self.drain_gate.try_lock() else {
            debug!(trigger, "sync already in progress, skipping");
            return None;
        };

        self.cancel_hide_timer();
        {
            let mut status = self.status.write().unwrap();
            status.syncing = true;
            status.show_success = false;
        }

        let mut queue = self.queue.lock().await;
        let pending = queue.pending_count();
        self.status.write().unwrap().pending_count = pending;
        debug!(trigger, pending, "sync cycle started");

        let report = queue.drain(self.backend.as_ref()).await;
        let remaining = queue.pending_count();
        // Final status write happens before the queue unlocks, so an
        // enqueue waiting on the lock cannot have its count overwritten
        // by this cycle's stale snapshot.
        {
            let mut status = self.status.write().unwrap();
            status.syncing = false;
            status.pending_count = remaining;
            status.last_synced = Some(Utc::now());
            status.show_success = report.synced > 0;
        }
        drop(queue);

        info!(
            trigger,
            synced = report.synced,
            failed = report.failed,
            quarantined = report.quarantined,
            "sync cycle finished"
        );

        if report.synced > 0 {
            self.arm_hide_timer();
        }

        Some(report)
    }

    /// Schedule the success indicator to clear after the window.
    fn arm_hide_timer(&self) {
        let status = Arc::clone(&self.status);
        let window = self.success_window;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            status.write().unwrap().show_success = false;
        });
        *self.hide_success.lock().unwrap() = Some(handle);
    }

    /// Stop a pending hide so an older cycle's timer cannot clear a newer
    /// cycle's indicator.
    fn cancel_hide_timer(&self) {
        if let Some(handle) = self.hide_success.lock().unwrap().take() {
            handle.abort();
        }
    }
}
