//! Handlers for account-backed documents.
//!
//! Edits go through [`VersioningService::save_document`], which decides
//! whether the new content gets a snapshot.
//!
//! [`VersioningService::save_document`]: downnote_core::versioning::VersioningService::save_document

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use downnote_core::content_stats::{format_reading_time, text_stats, TextStats};
use downnote_core::types::DbId;
use downnote_core::versioning::{CreateDocument, DocumentEdit};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// API request types
// ---------------------------------------------------------------------------

/// Request body for creating a document.
#[derive(Debug, Deserialize)]
pub struct CreateDocumentRequest {
    pub title: Option<String>,
    #[serde(alias = "content")]
    pub body: Option<String>,
}

/// Request body for editing a document. Absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateDocumentRequest {
    pub title: Option<String>,
    #[serde(alias = "content")]
    pub body: Option<String>,
    /// Revision the client last saw; a stale value is rejected with 409.
    pub expected_revision: Option<i64>,
}

/// Reader statistics for a document.
#[derive(Debug, Serialize)]
pub struct DocumentStatsResponse {
    #[serde(flatten)]
    pub stats: TextStats,
    /// Display label, e.g. `"3 min read"`.
    pub reading_time: String,
}

// ---------------------------------------------------------------------------
// GET /documents
// ---------------------------------------------------------------------------

/// List the caller's documents, most recently updated first.
pub async fn list_documents(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<impl IntoResponse> {
    let documents = state.versioning.list_documents(auth.user_id).await?;
    Ok(Json(DataResponse { data: documents }))
}

// ---------------------------------------------------------------------------
// POST /documents
// ---------------------------------------------------------------------------

/// Create a document. The title falls back to the body's first heading.
pub async fn create_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateDocumentRequest>,
) -> AppResult<impl IntoResponse> {
    let document = state
        .versioning
        .create_document(
            auth.user_id,
            CreateDocument {
                title: body.title,
                body: body.body,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: document })))
}

// ---------------------------------------------------------------------------
// GET /documents/{id}
// ---------------------------------------------------------------------------

pub async fn get_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let document = state.versioning.get_document(auth.user_id, id).await?;
    Ok(Json(DataResponse { data: document }))
}

// ---------------------------------------------------------------------------
// PATCH /documents/{id}
// ---------------------------------------------------------------------------

/// Apply an edit. The response carries the updated document, the snapshot
/// decision and the id of the snapshot taken, if any.
pub async fn update_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(body): Json<UpdateDocumentRequest>,
) -> AppResult<impl IntoResponse> {
    let saved = state
        .versioning
        .save_document(
            auth.user_id,
            id,
            DocumentEdit {
                title: body.title,
                body: body.body,
                expected_revision: body.expected_revision,
            },
        )
        .await?;

    Ok(Json(DataResponse { data: saved }))
}

// ---------------------------------------------------------------------------
// DELETE /documents/{id}
// ---------------------------------------------------------------------------

/// Delete a document together with its history.
pub async fn delete_document(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    state.versioning.delete_document(auth.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// GET /documents/{id}/stats
// ---------------------------------------------------------------------------

pub async fn get_document_stats(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let document = state.versioning.get_document(auth.user_id, id).await?;
    let stats = text_stats(&document.body);

    Ok(Json(DataResponse {
        data: DocumentStatsResponse {
            reading_time: format_reading_time(stats.reading_time_mins),
            stats,
        },
    }))
}
