//! Shared fixtures for service tests: a fault-injecting wrapper around
//! [`MemoryStore`] and helpers for building guest documents.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use downnote_core::error::CoreError;
use downnote_core::guest::LocalDocument;
use downnote_core::memory::MemoryStore;
use downnote_core::store::{
    Document, DocumentStore, DocumentUpdate, NewDocument, NewSnapshot, Snapshot, SnapshotSummary,
};
use downnote_core::types::DbId;

pub const OWNER: DbId = 7;
pub const OTHER_OWNER: DbId = 8;

/// [`MemoryStore`] with switchable failures. Counts every write so tests can
/// assert that nothing was touched.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub fail_create_snapshot: AtomicBool,
    pub fail_latest_snapshot: AtomicBool,
    pub fail_prune: AtomicBool,
    pub fail_update: AtomicBool,
    /// Simulates a concurrent edit landing right after each snapshot write.
    pub edit_after_snapshot: AtomicBool,
    /// Titles whose creation fails.
    pub fail_create_titles: Mutex<HashSet<String>>,
    pub writes: AtomicUsize,
}

fn unavailable() -> CoreError {
    CoreError::StoreUnavailable("injected failure".to_string())
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_titles(&self, titles: &[&str]) {
        let mut set = self.fail_create_titles.lock().unwrap();
        set.extend(titles.iter().map(|t| t.to_string()));
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }

    /// Create a document owned by [`OWNER`].
    pub async fn seed(&self, title: &str, body: &str) -> Document {
        self.inner
            .create_document(
                &NewDocument {
                    title: title.to_string(),
                    body: body.to_string(),
                },
                OWNER,
            )
            .await
            .unwrap()
    }

    /// Insert a snapshot created `mins_ago` minutes in the past.
    pub fn seed_snapshot(&self, document_id: DbId, body: &str, mins_ago: i64) -> Snapshot {
        self.inner
            .insert_snapshot_at(
                document_id,
                &NewSnapshot::of("seeded", body),
                Utc::now() - Duration::minutes(mins_ago),
            )
            .unwrap()
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn get_document(&self, id: DbId, owner_id: DbId) -> Result<Option<Document>, CoreError> {
        self.inner.get_document(id, owner_id).await
    }

    async fn list_documents(&self, owner_id: DbId) -> Result<Vec<Document>, CoreError> {
        self.inner.list_documents(owner_id).await
    }

    async fn create_document(
        &self,
        input: &NewDocument,
        owner_id: DbId,
    ) -> Result<Document, CoreError> {
        if self.fail_create_titles.lock().unwrap().contains(&input.title) {
            return Err(unavailable());
        }
        self.write();
        self.inner.create_document(input, owner_id).await
    }

    async fn update_document(
        &self,
        id: DbId,
        input: &DocumentUpdate,
    ) -> Result<Document, CoreError> {
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.write();
        self.inner.update_document(id, input).await
    }

    async fn delete_document(&self, id: DbId) -> Result<bool, CoreError> {
        self.write();
        self.inner.delete_document(id).await
    }

    async fn get_latest_snapshot(&self, document_id: DbId) -> Result<Option<Snapshot>, CoreError> {
        if self.fail_latest_snapshot.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.inner.get_latest_snapshot(document_id).await
    }

    async fn get_snapshot(
        &self,
        document_id: DbId,
        snapshot_id: DbId,
    ) -> Result<Option<Snapshot>, CoreError> {
        self.inner.get_snapshot(document_id, snapshot_id).await
    }

    async fn list_snapshots(&self, document_id: DbId) -> Result<Vec<SnapshotSummary>, CoreError> {
        self.inner.list_snapshots(document_id).await
    }

    async fn create_snapshot(
        &self,
        document_id: DbId,
        input: &NewSnapshot,
    ) -> Result<Snapshot, CoreError> {
        if self.fail_create_snapshot.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.write();
        let snapshot = self.inner.create_snapshot(document_id, input).await?;
        if self.edit_after_snapshot.load(Ordering::SeqCst) {
            let concurrent = DocumentUpdate {
                body: Some("edited in another tab".to_string()),
                ..Default::default()
            };
            self.inner.update_document(document_id, &concurrent).await?;
        }
        Ok(snapshot)
    }

    async fn count_snapshots(&self, document_id: DbId) -> Result<i64, CoreError> {
        if self.fail_prune.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.inner.count_snapshots(document_id).await
    }

    async fn list_snapshot_ids_newest_first(
        &self,
        document_id: DbId,
        limit: i64,
    ) -> Result<Vec<DbId>, CoreError> {
        self.inner
            .list_snapshot_ids_newest_first(document_id, limit)
            .await
    }

    async fn delete_snapshots_except(
        &self,
        document_id: DbId,
        keep_ids: &[DbId],
    ) -> Result<u64, CoreError> {
        self.write();
        self.inner.delete_snapshots_except(document_id, keep_ids).await
    }

    async fn ping(&self) -> Result<(), CoreError> {
        self.inner.ping().await
    }
}

/// A guest document stamped with the current time.
pub fn local_doc(id: &str, title: &str, body: &str) -> LocalDocument {
    let now = Utc::now();
    LocalDocument {
        id: id.to_string(),
        title: title.to_string(),
        body: body.to_string(),
        created_at: now,
        updated_at: now,
    }
}
