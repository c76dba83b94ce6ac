pub mod documents;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /documents                                       list, create
/// /documents/migrate                               guest migration (POST)
/// /documents/{id}                                  get, edit (PATCH), delete
/// /documents/{id}/stats                            reader stats
/// /documents/{id}/versions                         history
/// /documents/{id}/versions/{version_id}            snapshot with body
/// /documents/{id}/versions/{version_id}/restore    restore (POST)
/// ```
///
/// Every route requires a Bearer token.
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/documents", documents::router())
}
