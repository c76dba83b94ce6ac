//! Route definitions for documents, their history and guest migration.
//!
//! ```text
//! DOCUMENTS (mounted at /documents):
//! GET    /                                         list_documents
//! POST   /                                         create_document
//! POST   /migrate                                  migrate_guest_documents
//! GET    /{id}                                     get_document
//! PATCH  /{id}                                     update_document
//! DELETE /{id}                                     delete_document
//! GET    /{id}/stats                               get_document_stats
//! GET    /{id}/versions                            list_versions
//! GET    /{id}/versions/{version_id}               get_version
//! POST   /{id}/versions/{version_id}/restore       restore_version
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{documents, migration, versions};
use crate::state::AppState;

/// Document routes -- mounted at `/documents`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(documents::list_documents).post(documents::create_document),
        )
        .route("/migrate", post(migration::migrate_guest_documents))
        .route(
            "/{id}",
            get(documents::get_document)
                .patch(documents::update_document)
                .delete(documents::delete_document),
        )
        .route("/{id}/stats", get(documents::get_document_stats))
        .route("/{id}/versions", get(versions::list_versions))
        .route("/{id}/versions/{version_id}", get(versions::get_version))
        .route(
            "/{id}/versions/{version_id}/restore",
            post(versions::restore_version),
        )
}
