//! Core types for offline-first sync.
//!
//! A [`Mutation`] is a typed intent produced by a user action; the queue
//! stores it as a [`QueueItem`] whose payload stays raw JSON at rest, so a
//! corrupt row degrades to one quarantined item instead of poisoning the
//! whole queue on deserialize.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::settings::SettingsPatch;
use crate::srs::Rating;

/// Closed set of mutation kinds the queue can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MutationKind {
    LessonCompletion,
    ReviewRating,
    SettingsUpdate,
}

impl MutationKind {
    /// Wire/display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationKind::LessonCompletion => "lesson-completion",
            MutationKind::ReviewRating => "review-rating",
            MutationKind::SettingsUpdate => "settings-update",
        }
    }
}

impl std::fmt::Display for MutationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A finished lesson. The remote store upserts on (user, lesson).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonCompletion {
    pub user_id: String,
    pub lesson_id: String,
    pub completed_at: DateTime<Utc>,
}

/// One graded review. The remote store upserts on (user, word).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRating {
    pub user_id: String,
    pub word_id: String,
    pub rating: Rating,
    pub rated_at: DateTime<Utc>,
}

/// Partial update of a user's remote settings record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub user_id: String,
    pub patch: SettingsPatch,
}

/// A typed mutation intent.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    LessonCompletion(LessonCompletion),
    ReviewRating(ReviewRating),
    SettingsUpdate(SettingsUpdate),
}

impl Mutation {
    pub fn kind(&self) -> MutationKind {
        match self {
            Mutation::LessonCompletion(_) => MutationKind::LessonCompletion,
            Mutation::ReviewRating(_) => MutationKind::ReviewRating,
            Mutation::SettingsUpdate(_) => MutationKind::SettingsUpdate,
        }
    }

    fn payload_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            Mutation::LessonCompletion(p) => serde_json::to_value(p),
            Mutation::ReviewRating(p) => serde_json::to_value(p),
            Mutation::SettingsUpdate(p) => serde_json::to_value(p),
        }
    }

    /// Check required fields before any network call.
    fn validate(&self) -> Result<(), SyncError> {
        match self {
            Mutation::LessonCompletion(p) => {
                require_field(self.kind(), "user_id", &p.user_id)?;
                require_field(self.kind(), "lesson_id", &p.lesson_id)
            }
            Mutation::ReviewRating(p) => {
                require_field(self.kind(), "user_id", &p.user_id)?;
                require_field(self.kind(), "word_id", &p.word_id)
            }
            Mutation::SettingsUpdate(p) => require_field(self.kind(), "user_id", &p.user_id),
        }
    }
}

fn require_field(kind: MutationKind, field: &str, value: &str) -> Result<(), SyncError> {
    if value.is_empty() {
        return Err(SyncError::InvalidPayload {
            kind,
            message: format!("missing required field '{field}'"),
        });
    }
    Ok(())
}

/// A queued mutation in its durable shape:
/// `{id, type, payload, created_at, retry_count}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueItem {
    /// Unique, locally generated identifier.
    pub id: String,
    #[serde(rename = "type")]
    pub kind: MutationKind,
    /// JSON payload as stored; decoded and validated at drain time.
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
    /// Failed drain attempts so far.
    pub retry_count: u32,
}

impl QueueItem {
    /// Wrap a mutation for the queue with a fresh id and zero retries.
    pub fn from_mutation(mutation: &Mutation) -> Result<Self, SyncError> {
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind: mutation.kind(),
            payload: mutation.payload_value()?,
            created_at: Utc::now(),
            retry_count: 0,
        })
    }

    /// Reconstruct and validate the typed mutation.
    ///
    /// Fails fast on a missing or mistyped payload field; the caller counts
    /// that like any other failed attempt so persistently-malformed items
    /// reach quarantine instead of looping forever.
    pub fn decode(&self) -> Result<Mutation, SyncError> {
        let mutation = match self.kind {
            MutationKind::LessonCompletion => Mutation::LessonCompletion(self.parse_payload()?),
            MutationKind::ReviewRating => Mutation::ReviewRating(self.parse_payload()?),
            MutationKind::SettingsUpdate => Mutation::SettingsUpdate(self.parse_payload()?),
        };
        mutation.validate()?;
        Ok(mutation)
    }

    fn parse_payload<T: DeserializeOwned>(&self) -> Result<T, SyncError> {
        serde_json::from_value(self.payload.clone()).map_err(|e| SyncError::InvalidPayload {
            kind: self.kind,
            message: e.to_string(),
        })
    }
}

/// Tally of one drain cycle. `failed` counts every failed attempt in the
/// pass; `quarantined` is the subset that hit the retry ceiling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrainReport {
    pub synced: usize,
    pub failed: usize,
    pub quarantined: usize,
}

/// Shared sync status surface. UI reads snapshots; only the orchestrator
/// writes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncStatus {
    pub online: bool,
    pub syncing: bool,
    pub pending_count: usize,
    pub last_synced: Option<DateTime<Utc>>,
    /// True for a short window after a cycle that synced at least one item.
    pub show_success: bool,
}

/// Sync error types.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Backend error: HTTP {status}")]
    Backend { status: u16 },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid payload for {kind}: {message}")]
    InvalidPayload { kind: MutationKind, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review_rating() -> Mutation {
        Mutation::ReviewRating(ReviewRating {
            user_id: "u1".into(),
            word_id: "w1".into(),
            rating: Rating::Good,
            rated_at: Utc::now(),
        })
    }

    #[test]
    fn test_queue_item_wire_shape() {
        let item = QueueItem::from_mutation(&review_rating()).unwrap();
        let json = serde_json::to_value(&item).unwrap();

        assert!(json.get("id").is_some());
        assert_eq!(json["type"], "review-rating");
        assert_eq!(json["payload"]["word_id"], "w1");
        assert_eq!(json["payload"]["rating"], "good");
        assert!(json.get("created_at").is_some());
        assert_eq!(json["retry_count"], 0);
    }

    #[test]
    fn test_decode_round_trip() {
        let mutation = review_rating();
        let item = QueueItem::from_mutation(&mutation).unwrap();
        let raw = serde_json::to_string(&item).unwrap();
        let back: QueueItem = serde_json::from_str(&raw).unwrap();

        assert_eq!(back, item);
        assert_eq!(back.decode().unwrap(), mutation);
    }

    #[test]
    fn test_decode_rejects_missing_field() {
        let item = QueueItem {
            id: "i1".into(),
            kind: MutationKind::LessonCompletion,
            payload: serde_json::json!({"user_id": "u1"}),
            created_at: Utc::now(),
            retry_count: 0,
        };
        let err = item.decode().unwrap_err();
        assert!(matches!(err, SyncError::InvalidPayload { .. }));
    }

    #[test]
    fn test_decode_rejects_empty_required_field() {
        let item = QueueItem {
            id: "i1".into(),
            kind: MutationKind::ReviewRating,
            payload: serde_json::json!({
                "user_id": "",
                "word_id": "w1",
                "rating": "good",
                "rated_at": Utc::now(),
            }),
            created_at: Utc::now(),
            retry_count: 0,
        };
        let err = item.decode().unwrap_err();
        assert!(err.to_string().contains("user_id"));
    }

    #[test]
    fn test_decode_rejects_out_of_range_rating() {
        let item = QueueItem {
            id: "i1".into(),
            kind: MutationKind::ReviewRating,
            payload: serde_json::json!({
                "user_id": "u1",
                "word_id": "w1",
                "rating": "perfect",
                "rated_at": Utc::now(),
            }),
            created_at: Utc::now(),
            retry_count: 0,
        };
        assert!(item.decode().is_err());
    }

    #[test]
    fn test_kind_strings() {
        assert_eq!(MutationKind::LessonCompletion.as_str(), "lesson-completion");
        assert_eq!(MutationKind::ReviewRating.as_str(), "review-rating");
        assert_eq!(MutationKind::SettingsUpdate.as_str(), "settings-update");
        let parsed: MutationKind = serde_json::from_str("\"settings-update\"").unwrap();
        assert_eq!(parsed, MutationKind::SettingsUpdate);
    }

    #[test]
    fn test_default_status() {
        let status = SyncStatus::default();
        assert!(!status.online);
        assert!(!status.syncing);
        assert_eq!(status.pending_count, 0);
        assert!(status.last_synced.is_none());
        assert!(!status.show_success);
    }
}
