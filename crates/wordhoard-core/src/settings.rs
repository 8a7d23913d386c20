//! TOML-based user settings.
//!
//! Stores learning preferences plus local client configuration at
//! `~/.config/wordhoard/settings.toml`. The learning preferences are what
//! a settings-update mutation pushes to the remote store; [`SettingsPatch`]
//! is the partial-update payload for that.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::SettingsError;
use crate::storage::data_dir;

/// User settings.
///
/// Serialized to/from TOML at `~/.config/wordhoard/settings.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Identifier handed to us by the session provider.
    #[serde(default = "default_user_id")]
    pub user_id: String,
    /// Words to review per day.
    #[serde(default = "default_daily_goal")]
    pub daily_goal: u32,
    /// New words introduced per day.
    #[serde(default = "default_new_word_limit")]
    pub new_word_limit: u32,
    #[serde(default = "default_true")]
    pub reminders_enabled: bool,
    /// Local hour (0-23) for the daily reminder.
    #[serde(default = "default_reminder_hour")]
    pub reminder_hour: u32,
    /// Remote API base URL. When unset, mutations stay queued locally
    /// until an endpoint is configured.
    #[serde(default)]
    pub api_url: Option<String>,
}

// Default functions
fn default_user_id() -> String {
    "local".into()
}
fn default_daily_goal() -> u32 {
    20
}
fn default_new_word_limit() -> u32 {
    10
}
fn default_reminder_hour() -> u32 {
    9
}
fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            user_id: default_user_id(),
            daily_goal: default_daily_goal(),
            new_word_limit: default_new_word_limit(),
            reminders_enabled: true,
            reminder_hour: default_reminder_hour(),
            api_url: None,
        }
    }
}

impl Settings {
    fn path() -> Result<PathBuf, SettingsError> {
        Ok(data_dir()?.join("settings.toml"))
    }

    /// Load from disk, writing and returning the defaults on first run.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be parsed, or if the
    /// defaults cannot be written.
    pub fn load_or_default() -> Result<Self, SettingsError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                toml::from_str(&content).map_err(|e| SettingsError::ParseFailed(e.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let settings = Self::default();
                settings.save()?;
                Ok(settings)
            }
            Err(e) => Err(SettingsError::LoadFailed {
                path,
                message: e.to_string(),
            }),
        }
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<(), SettingsError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| SettingsError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| SettingsError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }
}

/// Partial settings update.
///
/// Only the learning preferences sync remotely; absent fields are left
/// untouched on apply and omitted from the serialized payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_goal: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_word_limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminders_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_hour: Option<u32>,
}

impl SettingsPatch {
    /// True when the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.daily_goal.is_none()
            && self.new_word_limit.is_none()
            && self.reminders_enabled.is_none()
            && self.reminder_hour.is_none()
    }

    /// Apply the present fields to `settings`.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(daily_goal) = self.daily_goal {
            settings.daily_goal = daily_goal;
        }
        if let Some(new_word_limit) = self.new_word_limit {
            settings.new_word_limit = new_word_limit;
        }
        if let Some(reminders_enabled) = self.reminders_enabled {
            settings.reminders_enabled = reminders_enabled;
        }
        if let Some(reminder_hour) = self.reminder_hour {
            settings.reminder_hour = reminder_hour;
        }
    }
}
