//! # WordHoard Core Library
//!
//! This library provides the core business logic for the WordHoard vocabulary
//! trainer. It implements an offline-first philosophy where every operation
//! runs against local storage, with remote sync happening opportunistically
//! through a durable mutation queue.
//!
//! ## Architecture
//!
//! - **SRS Engine**: Pure SM-2 style scheduling that maps review ratings to
//!   the next due date, plus the learning-state classifier built on top of it
//! - **Storage**: SQLite-based progress and streak persistence and TOML-based
//!   settings
//! - **Streaks**: Local-calendar streak tracking with weekly freeze credits
//! - **Sync**: Durable mutation queue drained to a pluggable remote backend
//!
//! ## Key Components
//!
//! - [`calculate_next_review`]: Scheduling step applied after each rating
//! - [`ProgressDb`]: Per-word review state and streak persistence
//! - [`SyncOrchestrator`]: Queue draining and sync status surface
//! - [`RemoteBackend`]: Trait for sync destinations

pub mod error;
pub mod settings;
pub mod srs;
pub mod storage;
pub mod streak;
pub mod sync;

pub use error::{CoreError, Result, SettingsError, StorageError};
pub use settings::{Settings, SettingsPatch};
pub use srs::{calculate_next_review, classify, LearningState, Rating, ReviewProgress};
pub use storage::{data_dir, KvStore, Lookup, ProgressDb};
pub use streak::{StreakRecord, StreakStatus};
pub use sync::{
    DrainReport, HttpBackend, MemoryBackend, Mutation, QueueItem, RemoteBackend, SyncOrchestrator,
    SyncQueue, SyncStatus,
};
