//! Row models for the `document_versions` table.

use downnote_core::store::{Snapshot, SnapshotSummary};
use downnote_core::types::{DbId, Timestamp};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A full row from the `document_versions` table.
#[derive(Debug, Clone, FromRow)]
pub struct DocumentVersionRow {
    pub id: DbId,
    pub document_id: DbId,
    pub title: String,
    pub body: String,
    pub char_count: i32,
    pub word_count: i32,
    pub created_at: Timestamp,
}

impl From<DocumentVersionRow> for Snapshot {
    fn from(row: DocumentVersionRow) -> Self {
        Self {
            id: row.id,
            document_id: row.document_id,
            title: row.title,
            body: row.body,
            char_count: row.char_count,
            word_count: row.word_count,
            created_at: row.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// History listing row; the body column is never selected.
#[derive(Debug, Clone, FromRow)]
pub struct DocumentVersionSummaryRow {
    pub id: DbId,
    pub title: String,
    pub char_count: i32,
    pub word_count: i32,
    pub created_at: Timestamp,
}

impl From<DocumentVersionSummaryRow> for SnapshotSummary {
    fn from(row: DocumentVersionSummaryRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            created_at: row.created_at,
            char_count: row.char_count,
            word_count: row.word_count,
        }
    }
}
