//! Durable FIFO queue of pending mutations.
//!
//! Items live as a JSON array under a single key in the local key-value
//! store. Reads are fail-safe: a missing key, a storage error, or content
//! that no longer parses all come back as an empty queue rather than an
//! error the caller has to invent a policy for.

use tracing::{debug, error, warn};

use super::backend::RemoteBackend;
use super::types::{DrainReport, Mutation, QueueItem, SyncError};
use crate::error::StorageError;
use crate::storage::KvStore;

/// Key holding items still waiting to sync.
pub const QUEUE_KEY: &str = "sync_queue";
/// Key holding quarantined items.
pub const FAILED_QUEUE_KEY: &str = "sync_queue_failed";
/// Attempts before an item is quarantined.
pub const MAX_RETRIES: u32 = 3;

/// Persistent queue of mutations awaiting upload.
///
/// Mutating operations take `&mut self`; callers that share a queue across
/// tasks wrap it in an async mutex, which also serializes enqueues against
/// a running drain.
pub struct SyncQueue {
    store: KvStore,
}

impl SyncQueue {
    pub fn new(store: KvStore) -> Self {
        Self { store }
    }

    /// Open the queue backed by the default on-disk store.
    pub fn open_default() -> Result<Self, StorageError> {
        Ok(Self::new(KvStore::open_default()?))
    }

    /// Append a mutation. The write is best-effort: a storage failure is
    /// logged and the item is still returned, matching the rest of the
    /// fail-safe queue behavior.
    pub fn enqueue(&mut self, mutation: &Mutation) -> Result<QueueItem, SyncError> {
        let item = QueueItem::from_mutation(mutation)?;
        let mut items = self.pending();
        items.push(item.clone());
        self.write_items(QUEUE_KEY, &items);
        debug!(id = %item.id, kind = %item.kind, "queued mutation");
        Ok(item)
    }

    /// Items still waiting to sync, in enqueue order.
    pub fn pending(&self) -> Vec<QueueItem> {
        self.read_items(QUEUE_KEY)
    }

    pub fn pending_count(&self) -> usize {
        self.pending().len()
    }

    /// Items that exhausted their retries.
    pub fn failed(&self) -> Vec<QueueItem> {
        self.read_items(FAILED_QUEUE_KEY)
    }

    /// Attempt every pending item once, in order.
    ///
    /// Successes are dropped, failures are kept for the next cycle with
    /// their retry count bumped, and items at the retry ceiling move to the
    /// failed queue. The pass itself never fails; the report says what
    /// happened.
    pub async fn drain(&mut self, backend: &dyn RemoteBackend) -> DrainReport {
        let items = self.pending();
        if items.is_empty() {
            return DrainReport::default();
        }

        let mut report = DrainReport::default();
        let mut still_pending = Vec::new();
        let mut newly_failed = Vec::new();

        for mut item in items {
            match apply_item(&item, backend).await {
                Ok(()) => {
                    debug!(id = %item.id, kind = %item.kind, "synced");
                    report.synced += 1;
                }
                Err(e) => {
                    item.retry_count += 1;
                    report.failed += 1;
                    if item.retry_count >= MAX_RETRIES {
                        error!(
                            id = %item.id,
                            kind = %item.kind,
                            error = %e,
                            "quarantining after {MAX_RETRIES} failed attempts"
                        );
                        report.quarantined += 1;
                        newly_failed.push(item);
                    } else {
                        warn!(
                            id = %item.id,
                            kind = %item.kind,
                            retry_count = item.retry_count,
                            error = %e,
                            "sync attempt failed, keeping for retry"
                        );
                        still_pending.push(item);
                    }
                }
            }
        }

        if !newly_failed.is_empty() {
            let mut failed = self.failed();
            failed.append(&mut newly_failed);
            self.write_items(FAILED_QUEUE_KEY, &failed);
        }
        self.write_items(QUEUE_KEY, &still_pending);

        report
    }

    /// Move every quarantined item back to the pending queue with its
    /// retry count reset. Returns how many were requeued.
    pub fn retry_failed(&mut self) -> usize {
        let failed = self.failed();
        if failed.is_empty() {
            return 0;
        }
        let count = failed.len();
        let mut pending = self.pending();
        for mut item in failed {
            item.retry_count = 0;
            pending.push(item);
        }
        self.write_items(QUEUE_KEY, &pending);
        self.write_items(FAILED_QUEUE_KEY, &[]);
        debug!(count, "requeued quarantined items");
        count
    }

    fn read_items(&self, key: &str) -> Vec<QueueItem> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(key, error = %e, "queue read failed, treating as empty");
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(items) => items,
            Err(e) => {
                warn!(key, error = %e, "queue content unreadable, treating as empty");
                Vec::new()
            }
        }
    }

    /// Persist a queue; an empty queue deletes the key. Write failures are
    /// logged, not propagated.
    fn write_items(&self, key: &str, items: &[QueueItem]) {
        let result = if items.is_empty() {
            self.store.delete(key)
        } else {
            match serde_json::to_string(items) {
                Ok(raw) => self.store.set(key, &raw),
                Err(e) => {
                    warn!(key, error = %e, "failed to encode queue");
                    return;
                }
            }
        };
        if let Err(e) = result {
            warn!(key, error = %e, "failed to persist queue");
        }
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &KvStore {
        &self.store
    }
}

/// Decode, validate, then dispatch a single item to the backend.
async fn apply_item(item: &QueueItem, backend: &dyn RemoteBackend) -> Result<(), SyncError> {
    match item.decode()? {
        Mutation::LessonCompletion(p) => backend.upsert_lesson_completion(&p).await,
        Mutation::ReviewRating(p) => backend.upsert_review_rating(&p).await,
        Mutation::SettingsUpdate(p) => backend.update_settings(&p).await,
    }
}
