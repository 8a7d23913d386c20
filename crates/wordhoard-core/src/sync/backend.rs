//! Remote backend abstraction.
//!
//! The queue drains through [`RemoteBackend`], so the scheduling and queue
//! logic never touch the network directly. [`HttpBackend`] talks to the real
//! API; [`MemoryBackend`] records mutations in memory for tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::Client;

use super::types::{LessonCompletion, Mutation, ReviewRating, SettingsUpdate, SyncError};

/// Destination for queued mutations.
///
/// Every operation is an upsert keyed by ids inside the payload, so
/// re-sending an item after a lost acknowledgement converges instead of
/// duplicating.
#[async_trait]
pub trait RemoteBackend: Send + Sync {
    async fn upsert_lesson_completion(&self, completion: &LessonCompletion)
        -> Result<(), SyncError>;

    async fn upsert_review_rating(&self, rating: &ReviewRating) -> Result<(), SyncError>;

    async fn update_settings(&self, update: &SettingsUpdate) -> Result<(), SyncError>;
}

/// Backend speaking JSON over HTTP to the sync API.
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn check_status(response: &reqwest::Response) -> Result<(), SyncError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    Err(SyncError::Backend {
        status: status.as_u16(),
    })
}

#[async_trait]
impl RemoteBackend for HttpBackend {
    async fn upsert_lesson_completion(
        &self,
        completion: &LessonCompletion,
    ) -> Result<(), SyncError> {
        let response = self
            .client
            .post(self.url("/v1/lesson-completions"))
            .json(completion)
            .send()
            .await?;
        check_status(&response)
    }

    async fn upsert_review_rating(&self, rating: &ReviewRating) -> Result<(), SyncError> {
        let response = self
            .client
            .post(self.url("/v1/review-ratings"))
            .json(rating)
            .send()
            .await?;
        check_status(&response)
    }

    async fn update_settings(&self, update: &SettingsUpdate) -> Result<(), SyncError> {
        let response = self
            .client
            .patch(self.url(&format!("/v1/users/{}/settings", update.user_id)))
            .json(&update.patch)
            .send()
            .await?;
        check_status(&response)
    }
}

/// In-memory backend recording applied mutations.
///
/// Supports scripted failures for exercising retry behavior. Clones share
/// state, so a test can keep a handle while the orchestrator owns another.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    inner: Arc<Mutex<MemoryBackendInner>>,
}

#[derive(Debug, Default)]
struct MemoryBackendInner {
    applied: Vec<Mutation>,
    fail_remaining: u32,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` calls fail with an HTTP 503.
    pub fn fail_next(&self, count: u32) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_remaining = count;
    }

    /// All mutations applied so far, in order.
    pub fn applied(&self) -> Vec<Mutation> {
        let inner = self.inner.lock().unwrap();
        inner.applied.clone()
    }

    pub fn applied_count(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.applied.len()
    }

    fn record(&self, mutation: Mutation) -> Result<(), SyncError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_remaining > 0 {
            inner.fail_remaining -= 1;
            return Err(SyncError::Backend { status: 503 });
        }
        inner.applied.push(mutation);
        Ok(())
    }
}

impl Clone for MemoryBackend {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl RemoteBackend for MemoryBackend {
    async fn upsert_lesson_completion(
        &self,
        completion: &LessonCompletion,
    ) -> Result<(), SyncError> {
        self.record(Mutation::LessonCompletion(completion.clone()))
    }

    async fn upsert_review_rating(&self, rating: &ReviewRating) -> Result<(), SyncError> {
        self.record(Mutation::ReviewRating(rating.clone()))
    }

    async fn update_settings(&self, update: &SettingsUpdate) -> Result<(), SyncError> {
        self.record(Mutation::SettingsUpdate(update.clone()))
    }
}
