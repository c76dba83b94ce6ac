//! Repository for the `document_versions` table.
//!
//! History is ordered by `(created_at, id)` so that snapshots taken in the
//! same instant still have a total order.

use downnote_core::store::NewSnapshot;
use downnote_core::types::DbId;
use sqlx::PgPool;

use crate::models::document_version::{DocumentVersionRow, DocumentVersionSummaryRow};

/// Column list for full version rows.
const COLUMNS: &str = "id, document_id, title, body, char_count, word_count, created_at";

/// Column list for history listings. Excludes `body`.
const SUMMARY_COLUMNS: &str = "id, title, char_count, word_count, created_at";

/// Provides snapshot storage and retention queries.
pub struct DocumentVersionRepo;

impl DocumentVersionRepo {
    /// Insert a snapshot of a document.
    pub async fn create(
        pool: &PgPool,
        document_id: DbId,
        input: &NewSnapshot,
    ) -> Result<DocumentVersionRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO document_versions (document_id, title, body, char_count, word_count)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DocumentVersionRow>(&query)
            .bind(document_id)
            .bind(&input.title)
            .bind(&input.body)
            .bind(input.char_count)
            .bind(input.word_count)
            .fetch_one(pool)
            .await
    }

    /// Find a version by id, only if it belongs to `document_id`.
    pub async fn find_for_document(
        pool: &PgPool,
        document_id: DbId,
        id: DbId,
    ) -> Result<Option<DocumentVersionRow>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM document_versions WHERE id = $1 AND document_id = $2");
        sqlx::query_as::<_, DocumentVersionRow>(&query)
            .bind(id)
            .bind(document_id)
            .fetch_optional(pool)
            .await
    }

    /// The most recent version of a document.
    pub async fn find_latest(
        pool: &PgPool,
        document_id: DbId,
    ) -> Result<Option<DocumentVersionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM document_versions
             WHERE document_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, DocumentVersionRow>(&query)
            .bind(document_id)
            .fetch_optional(pool)
            .await
    }

    /// History of a document, newest first, without bodies.
    pub async fn list_for_document(
        pool: &PgPool,
        document_id: DbId,
    ) -> Result<Vec<DocumentVersionSummaryRow>, sqlx::Error> {
        let query = format!(
            "SELECT {SUMMARY_COLUMNS} FROM document_versions
             WHERE document_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, DocumentVersionSummaryRow>(&query)
            .bind(document_id)
            .fetch_all(pool)
            .await
    }

    pub async fn count_for_document(pool: &PgPool, document_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM document_versions WHERE document_id = $1")
                .bind(document_id)
                .fetch_one(pool)
                .await?;
        Ok(row.0)
    }

    /// Ids of the newest `limit` versions of a document.
    pub async fn list_newest_ids(
        pool: &PgPool,
        document_id: DbId,
        limit: i64,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let rows: Vec<(DbId,)> = sqlx::query_as(
            "SELECT id FROM document_versions
             WHERE document_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2",
        )
        .bind(document_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Delete every version of `document_id` whose id is not in `keep_ids`.
    /// Returns the number of rows removed.
    pub async fn delete_except(
        pool: &PgPool,
        document_id: DbId,
        keep_ids: &[DbId],
    ) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM document_versions WHERE document_id = $1 AND id <> ALL($2)")
                .bind(document_id)
                .bind(keep_ids)
                .execute(pool)
                .await?;
        Ok(result.rows_affected())
    }
}
