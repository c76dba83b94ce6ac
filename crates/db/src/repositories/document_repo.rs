//! Repository for the `documents` table.

use downnote_core::store::{DocumentUpdate, NewDocument};
use downnote_core::types::DbId;
use sqlx::PgPool;

use crate::models::document::DocumentRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, owner_id, title, body, revision, created_at, updated_at";

/// Provides CRUD operations for documents.
pub struct DocumentRepo;

impl DocumentRepo {
    /// Insert a new document at revision 1.
    pub async fn create(
        pool: &PgPool,
        owner_id: DbId,
        input: &NewDocument,
    ) -> Result<DocumentRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO documents (owner_id, title, body)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DocumentRow>(&query)
            .bind(owner_id)
            .bind(&input.title)
            .bind(&input.body)
            .fetch_one(pool)
            .await
    }

    /// Find a document by id, scoped to its owner.
    pub async fn find_for_owner(
        pool: &PgPool,
        id: DbId,
        owner_id: DbId,
    ) -> Result<Option<DocumentRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM documents WHERE id = $1 AND owner_id = $2");
        sqlx::query_as::<_, DocumentRow>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a document by id regardless of owner.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<DocumentRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM documents WHERE id = $1");
        sqlx::query_as::<_, DocumentRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List an owner's documents, most recently updated first.
    pub async fn list_for_owner(
        pool: &PgPool,
        owner_id: DbId,
    ) -> Result<Vec<DocumentRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM documents
             WHERE owner_id = $1
             ORDER BY updated_at DESC, id DESC"
        );
        sqlx::query_as::<_, DocumentRow>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// Apply the non-`None` fields of `input` and bump the revision.
    ///
    /// When `expected_revision` is set the row is only touched if it still
    /// holds that revision. Returns `None` if no row matched.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &DocumentUpdate,
    ) -> Result<Option<DocumentRow>, sqlx::Error> {
        let query = format!(
            "UPDATE documents SET
                title = COALESCE($2, title),
                body = COALESCE($3, body),
                revision = revision + 1,
                updated_at = NOW()
             WHERE id = $1 AND ($4::BIGINT IS NULL OR revision = $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DocumentRow>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.body)
            .bind(input.expected_revision)
            .fetch_optional(pool)
            .await
    }

    /// Delete a document. Its versions go with it through the foreign key.
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
