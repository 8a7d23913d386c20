//! Core error types for wordhoard-core.
//!
//! This module defines the error hierarchy using thiserror. Sync-specific
//! errors live in [`crate::sync`] next to the types they classify.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for wordhoard-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Local storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Sync pipeline errors
    #[error("Sync error: {0}")]
    Sync(#[from] crate::sync::SyncError),

    /// Settings file errors
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Errors from the SQLite-backed stores.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// Stored row could not be decoded
    #[error("Corrupt row for '{key}': {message}")]
    CorruptRow { key: String, message: String },

    /// Filesystem errors while locating or creating the data directory
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Settings file errors.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Failed to load the settings file
    #[error("Failed to load settings from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save the settings file
    #[error("Failed to save settings to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse the settings file
    #[error("Failed to parse settings: {0}")]
    ParseFailed(String),

    /// Filesystem errors while locating the settings file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

impl From<String> for CoreError {
    fn from(message: String) -> Self {
        CoreError::Custom(message)
    }
}

impl From<&str> for CoreError {
    fn from(message: &str) -> Self {
        CoreError::Custom(message.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
