//! PostgreSQL implementation of [`DocumentStore`].

use async_trait::async_trait;
use downnote_core::error::CoreError;
use downnote_core::store::{
    Document, DocumentStore, DocumentUpdate, NewDocument, NewSnapshot, Snapshot, SnapshotSummary,
};
use downnote_core::types::DbId;

use crate::repositories::{DocumentRepo, DocumentVersionRepo};
use crate::DbPool;

/// Map a sqlx error onto the core taxonomy.
///
/// Connectivity problems become [`CoreError::StoreUnavailable`] so the API
/// can answer 503; everything else is an internal error.
pub fn map_sqlx_error(err: sqlx::Error) -> CoreError {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            CoreError::StoreUnavailable(err.to_string())
        }
        other => CoreError::Internal(format!("Database error: {other}")),
    }
}

/// [`DocumentStore`] backed by a connection pool.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: DbPool,
}

impl PgDocumentStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn get_document(&self, id: DbId, owner_id: DbId) -> Result<Option<Document>, CoreError> {
        let row = DocumentRepo::find_for_owner(&self.pool, id, owner_id)
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.map(Document::from))
    }

    async fn list_documents(&self, owner_id: DbId) -> Result<Vec<Document>, CoreError> {
        let rows = DocumentRepo::list_for_owner(&self.pool, owner_id)
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(Document::from).collect())
    }

    async fn create_document(
        &self,
        input: &NewDocument,
        owner_id: DbId,
    ) -> Result<Document, CoreError> {
        DocumentRepo::create(&self.pool, owner_id, input)
            .await
            .map(Document::from)
            .map_err(map_sqlx_error)
    }

    async fn update_document(
        &self,
        id: DbId,
        input: &DocumentUpdate,
    ) -> Result<Document, CoreError> {
        if let Some(row) = DocumentRepo::update(&self.pool, id, input)
            .await
            .map_err(map_sqlx_error)?
        {
            return Ok(row.into());
        }

        // No row matched: either the document is gone or the revision moved.
        match DocumentRepo::find_by_id(&self.pool, id)
            .await
            .map_err(map_sqlx_error)?
        {
            Some(current) => {
                tracing::debug!(
                    document_id = id,
                    revision = current.revision,
                    expected = ?input.expected_revision,
                    "Document update lost a revision race"
                );
                Err(CoreError::Conflict(format!(
                    "Document {id} is at revision {}, expected {}",
                    current.revision,
                    input.expected_revision.unwrap_or_default()
                )))
            }
            None => Err(CoreError::document_not_found(id)),
        }
    }

    async fn delete_document(&self, id: DbId) -> Result<bool, CoreError> {
        DocumentRepo::delete(&self.pool, id)
            .await
            .map_err(map_sqlx_error)
    }

    async fn get_latest_snapshot(&self, document_id: DbId) -> Result<Option<Snapshot>, CoreError> {
        let row = DocumentVersionRepo::find_latest(&self.pool, document_id)
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.map(Snapshot::from))
    }

    async fn get_snapshot(
        &self,
        document_id: DbId,
        snapshot_id: DbId,
    ) -> Result<Option<Snapshot>, CoreError> {
        let row = DocumentVersionRepo::find_for_document(&self.pool, document_id, snapshot_id)
            .await
            .map_err(map_sqlx_error)?;
        Ok(row.map(Snapshot::from))
    }

    async fn list_snapshots(&self, document_id: DbId) -> Result<Vec<SnapshotSummary>, CoreError> {
        let rows = DocumentVersionRepo::list_for_document(&self.pool, document_id)
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(SnapshotSummary::from).collect())
    }

    async fn create_snapshot(
        &self,
        document_id: DbId,
        input: &NewSnapshot,
    ) -> Result<Snapshot, CoreError> {
        match DocumentVersionRepo::create(&self.pool, document_id, input).await {
            Ok(row) => Ok(row.into()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
                Err(CoreError::document_not_found(document_id))
            }
            Err(e) => Err(map_sqlx_error(e)),
        }
    }

    async fn count_snapshots(&self, document_id: DbId) -> Result<i64, CoreError> {
        DocumentVersionRepo::count_for_document(&self.pool, document_id)
            .await
            .map_err(map_sqlx_error)
    }

    async fn list_snapshot_ids_newest_first(
        &self,
        document_id: DbId,
        limit: i64,
    ) -> Result<Vec<DbId>, CoreError> {
        DocumentVersionRepo::list_newest_ids(&self.pool, document_id, limit)
            .await
            .map_err(map_sqlx_error)
    }

    async fn delete_snapshots_except(
        &self,
        document_id: DbId,
        keep_ids: &[DbId],
    ) -> Result<u64, CoreError> {
        DocumentVersionRepo::delete_except(&self.pool, document_id, keep_ids)
            .await
            .map_err(map_sqlx_error)
    }

    async fn ping(&self) -> Result<(), CoreError> {
        crate::health_check(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }
}
