//! In-process [`DocumentStore`] implementation.
//!
//! Backs the service tests and any embedding that does not need durability.
//! Ids are assigned from per-table counters, mirroring BIGSERIAL, so the
//! `(created_at, id)` total order holds here too.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::error::CoreError;
use crate::store::{
    Document, DocumentStore, DocumentUpdate, NewDocument, NewSnapshot, Snapshot, SnapshotSummary,
};
use crate::types::{DbId, Timestamp};

#[derive(Debug, Default)]
struct Tables {
    last_document_id: DbId,
    last_snapshot_id: DbId,
    documents: BTreeMap<DbId, Document>,
    snapshots: Vec<Snapshot>,
}

impl Tables {
    /// Snapshots of one document, newest first.
    fn history(&self, document_id: DbId) -> Vec<&Snapshot> {
        let mut history: Vec<&Snapshot> = self
            .snapshots
            .iter()
            .filter(|s| s.document_id == document_id)
            .collect();
        history.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        history
    }
}

/// Thread-safe in-memory document and snapshot store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, CoreError> {
        self.tables
            .lock()
            .map_err(|_| CoreError::Internal("Memory store lock poisoned".to_string()))
    }

    /// Insert a snapshot with an explicit creation time, e.g. when importing
    /// history from elsewhere.
    pub fn insert_snapshot_at(
        &self,
        document_id: DbId,
        input: &NewSnapshot,
        created_at: Timestamp,
    ) -> Result<Snapshot, CoreError> {
        let mut tables = self.tables()?;
        if !tables.documents.contains_key(&document_id) {
            return Err(CoreError::document_not_found(document_id));
        }
        tables.last_snapshot_id += 1;
        let snapshot = Snapshot {
            id: tables.last_snapshot_id,
            document_id,
            title: input.title.clone(),
            body: input.body.clone(),
            char_count: input.char_count,
            word_count: input.word_count,
            created_at,
        };
        tables.snapshots.push(snapshot.clone());
        Ok(snapshot)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_document(&self, id: DbId, owner_id: DbId) -> Result<Option<Document>, CoreError> {
        Ok(self
            .tables()?
            .documents
            .get(&id)
            .filter(|d| d.owner_id == owner_id)
            .cloned())
    }

    async fn list_documents(&self, owner_id: DbId) -> Result<Vec<Document>, CoreError> {
        let mut docs: Vec<Document> = self
            .tables()?
            .documents
            .values()
            .filter(|d| d.owner_id == owner_id)
            .cloned()
            .collect();
        docs.sort_by(|a, b| (b.updated_at, b.id).cmp(&(a.updated_at, a.id)));
        Ok(docs)
    }

    async fn create_document(
        &self,
        input: &NewDocument,
        owner_id: DbId,
    ) -> Result<Document, CoreError> {
        let mut tables = self.tables()?;
        tables.last_document_id += 1;
        let now = Utc::now();
        let doc = Document {
            id: tables.last_document_id,
            owner_id,
            title: input.title.clone(),
            body: input.body.clone(),
            revision: 1,
            created_at: now,
            updated_at: now,
        };
        tables.documents.insert(doc.id, doc.clone());
        Ok(doc)
    }

    async fn update_document(
        &self,
        id: DbId,
        input: &DocumentUpdate,
    ) -> Result<Document, CoreError> {
        let mut tables = self.tables()?;
        let doc = tables
            .documents
            .get_mut(&id)
            .ok_or_else(|| CoreError::document_not_found(id))?;

        if let Some(expected) = input.expected_revision {
            if doc.revision != expected {
                return Err(CoreError::Conflict(format!(
                    "Document {id} is at revision {}, expected {expected}",
                    doc.revision
                )));
            }
        }
        if let Some(title) = &input.title {
            doc.title = title.clone();
        }
        if let Some(body) = &input.body {
            doc.body = body.clone();
        }
        doc.revision += 1;
        doc.updated_at = Utc::now();
        Ok(doc.clone())
    }

    async fn delete_document(&self, id: DbId) -> Result<bool, CoreError> {
        let mut tables = self.tables()?;
        let removed = tables.documents.remove(&id).is_some();
        if removed {
            tables.snapshots.retain(|s| s.document_id != id);
        }
        Ok(removed)
    }

    async fn get_latest_snapshot(&self, document_id: DbId) -> Result<Option<Snapshot>, CoreError> {
        Ok(self
            .tables()?
            .history(document_id)
            .first()
            .map(|s| (*s).clone()))
    }

    async fn get_snapshot(
        &self,
        document_id: DbId,
        snapshot_id: DbId,
    ) -> Result<Option<Snapshot>, CoreError> {
        Ok(self
            .tables()?
            .snapshots
            .iter()
            .find(|s| s.id == snapshot_id && s.document_id == document_id)
            .cloned())
    }

    async fn list_snapshots(&self, document_id: DbId) -> Result<Vec<SnapshotSummary>, CoreError> {
        Ok(self
            .tables()?
            .history(document_id)
            .into_iter()
            .map(SnapshotSummary::from)
            .collect())
    }

    async fn create_snapshot(
        &self,
        document_id: DbId,
        input: &NewSnapshot,
    ) -> Result<Snapshot, CoreError> {
        self.insert_snapshot_at(document_id, input, Utc::now())
    }

    async fn count_snapshots(&self, document_id: DbId) -> Result<i64, CoreError> {
        let count = self
            .tables()?
            .snapshots
            .iter()
            .filter(|s| s.document_id == document_id)
            .count();
        Ok(count as i64)
    }

    async fn list_snapshot_ids_newest_first(
        &self,
        document_id: DbId,
        limit: i64,
    ) -> Result<Vec<DbId>, CoreError> {
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(self
            .tables()?
            .history(document_id)
            .into_iter()
            .take(limit)
            .map(|s| s.id)
            .collect())
    }

    async fn delete_snapshots_except(
        &self,
        document_id: DbId,
        keep_ids: &[DbId],
    ) -> Result<u64, CoreError> {
        let mut tables = self.tables()?;
        let before = tables.snapshots.len();
        tables
            .snapshots
            .retain(|s| s.document_id != document_id || keep_ids.contains(&s.id));
        Ok((before - tables.snapshots.len()) as u64)
    }

    async fn ping(&self) -> Result<(), CoreError> {
        self.tables().map(|_| ())
    }
}
