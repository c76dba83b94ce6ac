//! Guest document migration endpoint.
//!
//! The client posts its guest export (the JSON array written by the guest
//! library) right after signing in. The response tells it which local
//! documents it still has to keep.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use downnote_core::guest::{parse_export_value, GuestLibrary, GuestScope, LocalDocument};
use downnote_core::migration::{MigrationResult, MigrationService};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Migration outcome plus the local documents the client must keep.
#[derive(Debug, Serialize)]
pub struct MigrationResponse {
    #[serde(flatten)]
    pub result: MigrationResult,
    /// Empty after a full success.
    pub remaining: Vec<LocalDocument>,
}

// ---------------------------------------------------------------------------
// POST /documents/migrate
// ---------------------------------------------------------------------------

/// Copy guest documents into the caller's account.
///
/// Malformed entries are dropped; a payload that is not an array, or whose
/// entries are all malformed, is rejected with 400.
pub async fn migrate_guest_documents(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<serde_json::Value>,
) -> AppResult<impl IntoResponse> {
    let documents = parse_export_value(payload)?;
    let scope = GuestScope::new(GuestLibrary::from_documents(documents));

    let result = MigrationService::new(state.store.as_ref())
        .migrate(auth.user_id, &scope)
        .await;

    let remaining = scope
        .snapshot()?
        .documents()
        .iter()
        .filter(|doc| !result.migrated_local_ids.contains(&doc.id))
        .cloned()
        .collect();

    Ok(Json(DataResponse {
        data: MigrationResponse { result, remaining },
    }))
}
