//! SQLite store for review progress and streak records.
//!
//! The app reads these rows between syncs; the remote store is the source
//! of truth only once the queue has drained. Rows are superseded in place,
//! never deleted.

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::StorageError;
use crate::srs::ReviewProgress;
use crate::streak::StreakRecord;

use super::data_dir;

const DATE_FMT: &str = "%Y-%m-%d";

/// Outcome of a local read.
///
/// Keeps "no data yet" and "read failed" apart so callers cannot treat a
/// storage failure as an empty state.
#[derive(Debug)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
    Unavailable(StorageError),
}

impl<T> Lookup<T> {
    /// The found value, discarding the distinction between absent and failed.
    pub fn into_option(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound | Lookup::Unavailable(_) => None,
        }
    }

    fn from_result(result: Result<Option<T>, StorageError>) -> Self {
        match result {
            Ok(Some(value)) => Lookup::Found(value),
            Ok(None) => Lookup::NotFound,
            Err(e) => Lookup::Unavailable(e),
        }
    }
}

/// SQLite database holding per-user learning state.
pub struct ProgressDb {
    conn: Connection,
}

impl ProgressDb {
    /// Open the database at `<data_dir>/progress.db`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_default() -> Result<Self, StorageError> {
        let path = data_dir()?.join("progress.db");
        Self::open(&path)
    }

    /// Open the database at an explicit path, creating the schema if needed.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), StorageError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS review_progress (
                    id            INTEGER PRIMARY KEY AUTOINCREMENT,
                    user_id       TEXT NOT NULL,
                    word_id       TEXT NOT NULL,
                    ease_factor   REAL NOT NULL,
                    interval_days INTEGER NOT NULL,
                    repetitions   INTEGER NOT NULL,
                    next_due      TEXT NOT NULL,
                    updated_at    TEXT NOT NULL,
                    UNIQUE (user_id, word_id)
                );

                CREATE TABLE IF NOT EXISTS streaks (
                    user_id        TEXT PRIMARY KEY,
                    current_streak INTEGER NOT NULL,
                    longest_streak INTEGER NOT NULL,
                    last_activity  TEXT,
                    freeze_used_on TEXT
                );

                CREATE INDEX IF NOT EXISTS idx_review_progress_due
                    ON review_progress(user_id, next_due);",
            )
            .map_err(|e| StorageError::MigrationFailed(e.to_string()))
    }

    /// Read scheduling state for one item.
    pub fn get_progress(&self, user_id: &str, word_id: &str) -> Lookup<ReviewProgress> {
        Lookup::from_result(self.fetch_progress(user_id, word_id))
    }

    fn fetch_progress(
        &self,
        user_id: &str,
        word_id: &str,
    ) -> Result<Option<ReviewProgress>, StorageError> {
        let row = self
            .conn
            .query_row(
                "SELECT ease_factor, interval_days, repetitions, next_due
                 FROM review_progress WHERE user_id = ?1 AND word_id = ?2",
                params![user_id, word_id],
                |row| {
                    Ok((
                        row.get::<_, f64>(0)?,
                        row.get::<_, u32>(1)?,
                        row.get::<_, u32>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((ease_factor, interval_days, repetitions, next_due)) => {
                let next_due = parse_timestamp(&next_due, word_id)?;
                Ok(Some(ReviewProgress {
                    ease_factor,
                    interval_days,
                    repetitions,
                    next_due,
                }))
            }
            None => Ok(None),
        }
    }

    /// Write scheduling state for one item, superseding any previous row.
    pub fn put_progress(
        &self,
        user_id: &str,
        word_id: &str,
        progress: &ReviewProgress,
    ) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO review_progress
                 (user_id, word_id, ease_factor, interval_days, repetitions, next_due, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT (user_id, word_id) DO UPDATE SET
                 ease_factor = excluded.ease_factor,
                 interval_days = excluded.interval_days,
                 repetitions = excluded.repetitions,
                 next_due = excluded.next_due,
                 updated_at = excluded.updated_at",
            params![
                user_id,
                word_id,
                progress.ease_factor,
                progress.interval_days,
                progress.repetitions,
                progress.next_due.to_rfc3339(),
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Items due at or before `now`, soonest first.
    pub fn due_words(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<(String, ReviewProgress)>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT word_id, ease_factor, interval_days, repetitions, next_due
             FROM review_progress
             WHERE user_id = ?1 AND next_due <= ?2
             ORDER BY next_due ASC
             LIMIT ?3",
        )?;
        let rows = stmt.query_map(
            params![user_id, now.to_rfc3339(), limit as i64],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, f64>(1)?,
                    row.get::<_, u32>(2)?,
                    row.get::<_, u32>(3)?,
                    row.get::<_, String>(4)?,
                ))
            },
        )?;

        let mut due = Vec::new();
        for row in rows {
            let (word_id, ease_factor, interval_days, repetitions, next_due) = row?;
            let next_due = parse_timestamp(&next_due, &word_id)?;
            due.push((
                word_id,
                ReviewProgress {
                    ease_factor,
                    interval_days,
                    repetitions,
                    next_due,
                },
            ));
        }
        Ok(due)
    }

    /// Read a user's streak record.
    pub fn get_streak(&self, user_id: &str) -> Lookup<StreakRecord> {
        Lookup::from_result(self.fetch_streak(user_id))
    }

    fn fetch_streak(&self, user_id: &str) -> Result<Option<StreakRecord>, StorageError> {
        let row = self
            .conn
            .query_row(
                "SELECT current_streak, longest_streak, last_activity, freeze_used_on
                 FROM streaks WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok((
                        row.get::<_, u32>(0)?,
                        row.get::<_, u32>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, Option<String>>(3)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((current_streak, longest_streak, last_activity, freeze_used_on)) => {
                Ok(Some(StreakRecord {
                    current_streak,
                    longest_streak,
                    last_activity: parse_date(last_activity.as_deref(), user_id)?,
                    freeze_used_on: parse_date(freeze_used_on.as_deref(), user_id)?,
                }))
            }
            None => Ok(None),
        }
    }

    /// Write a user's streak record, superseding any previous row.
    pub fn put_streak(&self, user_id: &str, record: &StreakRecord) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO streaks
                 (user_id, current_streak, longest_streak, last_activity, freeze_used_on)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user_id,
                record.current_streak,
                record.longest_streak,
                record.last_activity.map(|d| d.format(DATE_FMT).to_string()),
                record.freeze_used_on.map(|d| d.format(DATE_FMT).to_string()),
            ],
        )?;
        Ok(())
    }
}

fn parse_timestamp(raw: &str, key: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::CorruptRow {
            key: key.to_string(),
            message: format!("bad timestamp '{raw}': {e}"),
        })
}

fn parse_date(raw: Option<&str>, key: &str) -> Result<Option<NaiveDate>, StorageError> {
    match raw {
        Some(raw) => NaiveDate::parse_from_str(raw, DATE_FMT)
            .map(Some)
            .map_err(|e| StorageError::CorruptRow {
                key: key.to_string(),
                message: format!("bad date '{raw}': {e}"),
            }),
        None => Ok(None),
    }
}
