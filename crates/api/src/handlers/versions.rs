//! Handlers for document history and restore.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

use downnote_core::types::DbId;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET /documents/{id}/versions
// ---------------------------------------------------------------------------

/// List snapshot summaries, newest first. Bodies are not included.
pub async fn list_versions(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let history = state.versioning.list_history(auth.user_id, id).await?;
    Ok(Json(DataResponse { data: history }))
}

// ---------------------------------------------------------------------------
// GET /documents/{id}/versions/{version_id}
// ---------------------------------------------------------------------------

pub async fn get_version(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, version_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let snapshot = state
        .versioning
        .get_version(auth.user_id, id, version_id)
        .await?;
    Ok(Json(DataResponse { data: snapshot }))
}

// ---------------------------------------------------------------------------
// POST /documents/{id}/versions/{version_id}/restore
// ---------------------------------------------------------------------------

/// Restore a document to one of its snapshots.
///
/// The current content is snapshotted first, so the restore can be undone by
/// restoring `safety_snapshot_id`.
pub async fn restore_version(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, version_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let outcome = state
        .versioning
        .restore(auth.user_id, id, version_id)
        .await?;
    Ok(Json(DataResponse { data: outcome }))
}
