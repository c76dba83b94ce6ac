//! Collaborator interfaces consumed by the versioning services.
//!
//! [`DocumentStore`] is the account-backed document and snapshot store
//! (PostgreSQL in production, see `downnote-db`). [`LocalStore`] is a handle
//! to one anonymous storage scope. Services receive both explicitly, so tests
//! can hand in fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::guest::LocalDocument;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A live document owned by one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DbId,
    pub owner_id: DbId,
    pub title: String,
    pub body: String,
    /// Incremented on every update; used for compare-and-swap writes.
    pub revision: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An immutable full-content copy of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub id: DbId,
    pub document_id: DbId,
    pub title: String,
    pub body: String,
    pub char_count: i32,
    pub word_count: i32,
    pub created_at: Timestamp,
}

/// History listing entry. Never carries the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotSummary {
    pub id: DbId,
    pub title: String,
    pub created_at: Timestamp,
    pub char_count: i32,
    pub word_count: i32,
}

impl From<&Snapshot> for SnapshotSummary {
    fn from(s: &Snapshot) -> Self {
        Self {
            id: s.id,
            title: s.title.clone(),
            created_at: s.created_at,
            char_count: s.char_count,
            word_count: s.word_count,
        }
    }
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Input for creating a document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewDocument {
    pub title: String,
    pub body: String,
}

/// Partial update of a document. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DocumentUpdate {
    pub title: Option<String>,
    pub body: Option<String>,
    /// When set, the write only applies if the stored revision still matches.
    pub expected_revision: Option<i64>,
}

/// Input for creating a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSnapshot {
    pub title: String,
    pub body: String,
    pub char_count: i32,
    pub word_count: i32,
}

impl NewSnapshot {
    /// Build a snapshot input for `title`/`body`, computing its stats.
    pub fn of(title: &str, body: &str) -> Self {
        let stats = crate::content_stats::stats(body);
        Self {
            title: title.to_string(),
            body: body.to_string(),
            char_count: saturating_i32(stats.char_count),
            word_count: saturating_i32(stats.word_count),
        }
    }
}

fn saturating_i32(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Account-backed document and snapshot store.
///
/// Snapshot operations take a document id only; callers verify document
/// ownership first.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document if it exists and belongs to `owner_id`.
    async fn get_document(&self, id: DbId, owner_id: DbId) -> Result<Option<Document>, CoreError>;

    /// All documents of `owner_id`, most recently updated first.
    async fn list_documents(&self, owner_id: DbId) -> Result<Vec<Document>, CoreError>;

    async fn create_document(
        &self,
        input: &NewDocument,
        owner_id: DbId,
    ) -> Result<Document, CoreError>;

    /// Apply `input`, bump `updated_at` and `revision`.
    ///
    /// Fails with [`CoreError::NotFound`] if the document is gone and with
    /// [`CoreError::Conflict`] if `expected_revision` is stale.
    async fn update_document(&self, id: DbId, input: &DocumentUpdate)
        -> Result<Document, CoreError>;

    /// Delete a document and its snapshots. Returns `false` if nothing was deleted.
    async fn delete_document(&self, id: DbId) -> Result<bool, CoreError>;

    async fn get_latest_snapshot(&self, document_id: DbId) -> Result<Option<Snapshot>, CoreError>;

    /// Fetch a snapshot only if it belongs to `document_id`.
    async fn get_snapshot(
        &self,
        document_id: DbId,
        snapshot_id: DbId,
    ) -> Result<Option<Snapshot>, CoreError>;

    /// History of a document, newest first.
    async fn list_snapshots(&self, document_id: DbId) -> Result<Vec<SnapshotSummary>, CoreError>;

    async fn create_snapshot(
        &self,
        document_id: DbId,
        input: &NewSnapshot,
    ) -> Result<Snapshot, CoreError>;

    async fn count_snapshots(&self, document_id: DbId) -> Result<i64, CoreError>;

    /// Ids of the `limit` newest snapshots, ordered by `(created_at, id)` descending.
    async fn list_snapshot_ids_newest_first(
        &self,
        document_id: DbId,
        limit: i64,
    ) -> Result<Vec<DbId>, CoreError>;

    /// Delete every snapshot of `document_id` whose id is not in `keep_ids`.
    async fn delete_snapshots_except(
        &self,
        document_id: DbId,
        keep_ids: &[DbId],
    ) -> Result<u64, CoreError>;

    /// Cheap connectivity check.
    async fn ping(&self) -> Result<(), CoreError>;
}

/// Handle to one anonymous (guest) storage scope.
#[async_trait]
pub trait LocalStore: Send + Sync {
    async fn list(&self) -> Result<Vec<LocalDocument>, CoreError>;

    async fn clear(&self) -> Result<(), CoreError>;
}
