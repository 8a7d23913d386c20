//! Offline-first synchronization layer.
//!
//! User actions enqueue typed mutations into a durable local queue; the
//! orchestrator drains the queue to a remote backend when connectivity
//! events or explicit requests say to. Local state is always written first,
//! so every feature works with no network at all.

pub mod backend;
pub mod orchestrator;
pub mod queue;
pub mod types;


pub use backend::{HttpBackend, MemoryBackend, RemoteBackend};
pub use orchestrator::{SyncOrchestrator, DEFAULT_SUCCESS_WINDOW};
pub use queue::{SyncQueue, FAILED_QUEUE_KEY, MAX_RETRIES, QUEUE_KEY};
pub use types::{
    DrainReport, LessonCompletion, Mutation, MutationKind, QueueItem, ReviewRating,
    SettingsUpdate, SyncError, SyncStatus,
};
