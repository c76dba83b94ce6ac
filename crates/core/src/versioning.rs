//! Document operations with automatic snapshotting.
//!
//! [`VersioningService`] is the entry point for everything that touches a
//! live document: create, edit, delete, history browsing and restore. Edits
//! consult the [`VersionPolicy`] and may take a snapshot; snapshot and prune
//! failures are logged and never fail the edit itself.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::retention::RetentionManager;
use crate::restore::{RestoreCoordinator, RestoreFailure, RestoreOutcome};
use crate::store::{
    Document, DocumentStore, DocumentUpdate, NewDocument, NewSnapshot, Snapshot, SnapshotSummary,
};
use crate::title::{extract_title, UNTITLED_DOCUMENT};
use crate::types::DbId;
use crate::version_policy::{LastSnapshot, VersionDecision, VersionPolicy, VersionReason};

// ---------------------------------------------------------------------------
// Inputs / outputs
// ---------------------------------------------------------------------------

/// Request to create a document. Missing fields get defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateDocument {
    pub title: Option<String>,
    pub body: Option<String>,
}

/// An edit to a live document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentEdit {
    pub title: Option<String>,
    pub body: Option<String>,
    /// Revision the client last saw. When set, a stale write is rejected
    /// with [`CoreError::Conflict`] instead of silently overwriting.
    pub expected_revision: Option<i64>,
}

/// Result of [`VersioningService::save_document`].
#[derive(Debug, Clone, Serialize)]
pub struct SavedDocument {
    pub document: Document,
    /// The policy decision, if the edit touched the body.
    pub decision: Option<VersionDecision>,
    /// The snapshot taken for this edit, if any.
    pub snapshot_id: Option<DbId>,
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Document operations for one account-backed store.
#[derive(Clone)]
pub struct VersioningService {
    store: Arc<dyn DocumentStore>,
    policy: VersionPolicy,
}

impl VersioningService {
    pub fn new(store: Arc<dyn DocumentStore>, policy: VersionPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &VersionPolicy {
        &self.policy
    }

    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    // -- Documents --

    /// Create a document without taking a snapshot.
    ///
    /// When only a body is given, the title is taken from its first heading.
    pub async fn create_document(
        &self,
        owner_id: DbId,
        input: CreateDocument,
    ) -> Result<Document, CoreError> {
        create_document_in(self.store.as_ref(), owner_id, input).await
    }

    /// Fetch a document owned by `owner_id`.
    pub async fn get_document(&self, owner_id: DbId, id: DbId) -> Result<Document, CoreError> {
        self.store
            .get_document(id, owner_id)
            .await?
            .ok_or_else(|| CoreError::document_not_found(id))
    }

    pub async fn list_documents(&self, owner_id: DbId) -> Result<Vec<Document>, CoreError> {
        self.store.list_documents(owner_id).await
    }

    /// Apply an edit, snapshotting the new content when the policy asks for it.
    pub async fn save_document(
        &self,
        owner_id: DbId,
        id: DbId,
        edit: DocumentEdit,
    ) -> Result<SavedDocument, CoreError> {
        self.get_document(owner_id, id).await?;

        let title = match (&edit.title, &edit.body) {
            (Some(title), _) => Some(title.clone()),
            (None, Some(body)) => Some(extract_title(body)),
            (None, None) => None,
        };

        let decision = match edit.body.as_deref() {
            Some(body) => Some(self.decide_for(id, body).await),
            None => None,
        };

        let update = DocumentUpdate {
            title,
            body: edit.body,
            expected_revision: edit.expected_revision,
        };
        let document = self.store.update_document(id, &update).await?;

        let snapshot_id = match decision {
            Some(d) if d.should_snapshot => self.snapshot_after_edit(&document, d.reason).await,
            _ => None,
        };

        Ok(SavedDocument {
            document,
            decision,
            snapshot_id,
        })
    }

    /// Delete a document and, through the store, its history.
    pub async fn delete_document(&self, owner_id: DbId, id: DbId) -> Result<(), CoreError> {
        self.get_document(owner_id, id).await?;
        if !self.store.delete_document(id).await? {
            return Err(CoreError::document_not_found(id));
        }
        tracing::info!(document_id = id, user_id = owner_id, "Document deleted");
        Ok(())
    }

    // -- History --

    /// Snapshot summaries for a document, newest first.
    pub async fn list_history(
        &self,
        owner_id: DbId,
        id: DbId,
    ) -> Result<Vec<SnapshotSummary>, CoreError> {
        self.get_document(owner_id, id).await?;
        self.store.list_snapshots(id).await
    }

    /// Fetch one snapshot, with body, of a document owned by `owner_id`.
    pub async fn get_version(
        &self,
        owner_id: DbId,
        id: DbId,
        snapshot_id: DbId,
    ) -> Result<Snapshot, CoreError> {
        self.get_document(owner_id, id).await?;
        self.store
            .get_snapshot(id, snapshot_id)
            .await?
            .ok_or_else(|| CoreError::version_not_found(snapshot_id))
    }

    /// Restore a document to one of its snapshots. See [`RestoreCoordinator`].
    pub async fn restore(
        &self,
        owner_id: DbId,
        id: DbId,
        snapshot_id: DbId,
    ) -> Result<RestoreOutcome, RestoreFailure> {
        RestoreCoordinator::new(self.store.as_ref(), self.policy)
            .restore(owner_id, id, snapshot_id)
            .await
    }

    // -- Helpers --

    /// Run the policy for `body` against the latest snapshot. A failed lookup
    /// is treated as "no snapshot needed" so the edit can proceed.
    async fn decide_for(&self, id: DbId, body: &str) -> VersionDecision {
        match self.store.get_latest_snapshot(id).await {
            Ok(latest) => {
                let last = latest.as_ref().map(|s| LastSnapshot {
                    body: &s.body,
                    created_at: s.created_at,
                });
                self.policy.decide(body, last, Utc::now())
            }
            Err(e) => {
                tracing::warn!(
                    document_id = id,
                    error = %e,
                    "Version lookup failed, skipping snapshot"
                );
                VersionDecision {
                    should_snapshot: false,
                    reason: VersionReason::NoVersionNeeded,
                }
            }
        }
    }

    async fn snapshot_after_edit(&self, document: &Document, reason: VersionReason) -> Option<DbId> {
        let input = NewSnapshot::of(&document.title, &document.body);
        match self.store.create_snapshot(document.id, &input).await {
            Ok(snapshot) => {
                tracing::info!(
                    document_id = document.id,
                    snapshot_id = snapshot.id,
                    %reason,
                    "Document version created"
                );
                RetentionManager::new(self.store.as_ref())
                    .prune_best_effort(document.id, self.policy.retention_count)
                    .await;
                Some(snapshot.id)
            }
            Err(e) => {
                tracing::error!(
                    document_id = document.id,
                    %reason,
                    error = %e,
                    "Failed to create document version"
                );
                None
            }
        }
    }
}

/// Snapshot-less document creation shared by [`VersioningService`] and guest
/// migration.
pub(crate) async fn create_document_in(
    store: &dyn DocumentStore,
    owner_id: DbId,
    input: CreateDocument,
) -> Result<Document, CoreError> {
    let title = match (input.title, input.body.as_deref()) {
        (Some(title), _) if !title.is_empty() => title,
        (_, Some(body)) if !body.is_empty() => extract_title(body),
        _ => UNTITLED_DOCUMENT.to_string(),
    };
    let new = NewDocument {
        title,
        body: input.body.unwrap_or_default(),
    };
    let document = store.create_document(&new, owner_id).await?;

    tracing::info!(
        document_id = document.id,
        user_id = owner_id,
        "Document created"
    );
    Ok(document)
}
