mod kv;
mod progress_db;

pub use kv::KvStore;
pub use progress_db::{Lookup, ProgressDb};

use std::path::PathBuf;

/// Returns `~/.config/wordhoard[-dev]/` based on WORDHOARD_ENV.
///
/// Set WORDHOARD_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if the config directory cannot be created.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("WORDHOARD_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("wordhoard-dev")
    } else {
        base_dir.join("wordhoard")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
