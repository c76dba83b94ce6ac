//! Restoring a document to a prior snapshot.
//!
//! The restore runs as a small state machine:
//!
//! ```text
//! Idle -> SnapshottingCurrent -> Overwriting -> Pruning -> Done
//!   \            \                    \
//!    `------------`--------------------`--> Failed
//! ```
//!
//! The live state is always snapshotted before it is overwritten, so every
//! restore can itself be undone. Pruning is best-effort and cannot fail the
//! restore.

use serde::Serialize;

use crate::error::CoreError;
use crate::retention::RetentionManager;
use crate::store::{Document, DocumentStore, DocumentUpdate, NewSnapshot};
use crate::types::DbId;
use crate::version_policy::VersionPolicy;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Progress of a restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RestoreStep {
    Idle,
    SnapshottingCurrent,
    Overwriting,
    Pruning,
    Done,
    Failed,
}

/// A restore that did not complete, with the step it failed in.
///
/// Failing in [`RestoreStep::Idle`] means the target could not be resolved
/// and nothing was written.
#[derive(Debug, thiserror::Error)]
#[error("Restore failed while {step:?}: {error}")]
pub struct RestoreFailure {
    pub step: RestoreStep,
    #[source]
    pub error: CoreError,
}

/// A completed restore.
#[derive(Debug, Clone, Serialize)]
pub struct RestoreOutcome {
    /// The document after the overwrite.
    pub document: Document,
    /// Snapshot holding the state that was replaced.
    pub safety_snapshot_id: DbId,
    /// Snapshots removed by retention, `None` if pruning failed.
    pub pruned: Option<u64>,
}

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

/// Drives one restore against a store.
pub struct RestoreCoordinator<'a> {
    store: &'a dyn DocumentStore,
    policy: VersionPolicy,
    step: RestoreStep,
}

impl<'a> RestoreCoordinator<'a> {
    pub fn new(store: &'a dyn DocumentStore, policy: VersionPolicy) -> Self {
        Self {
            store,
            policy,
            step: RestoreStep::Idle,
        }
    }

    pub fn step(&self) -> RestoreStep {
        self.step
    }

    /// Restore `document_id` (owned by `owner_id`) to `snapshot_id`.
    ///
    /// Snapshots that exist but belong to another document are reported
    /// exactly like missing ones.
    pub async fn restore(
        mut self,
        owner_id: DbId,
        document_id: DbId,
        snapshot_id: DbId,
    ) -> Result<RestoreOutcome, RestoreFailure> {
        // Resolve: no side effects on failure.
        let current = self
            .store
            .get_document(document_id, owner_id)
            .await
            .and_then(|d| d.ok_or_else(|| CoreError::document_not_found(document_id)))
            .map_err(|e| self.fail(e))?;
        let target = self
            .store
            .get_snapshot(document_id, snapshot_id)
            .await
            .and_then(|s| s.ok_or_else(|| CoreError::version_not_found(snapshot_id)))
            .map_err(|e| self.fail(e))?;

        self.step = RestoreStep::SnapshottingCurrent;
        let safety = self
            .store
            .create_snapshot(document_id, &NewSnapshot::of(&current.title, &current.body))
            .await
            .map_err(|e| self.fail(e))?;
        tracing::debug!(
            document_id,
            safety_snapshot_id = safety.id,
            "Safety snapshot taken before restore"
        );

        self.step = RestoreStep::Overwriting;
        let update = DocumentUpdate {
            title: Some(target.title),
            body: Some(target.body),
            expected_revision: Some(current.revision),
        };
        let document = self
            .store
            .update_document(document_id, &update)
            .await
            .map_err(|e| self.fail(e))?;

        self.step = RestoreStep::Pruning;
        let pruned = RetentionManager::new(self.store)
            .prune_best_effort(document_id, self.policy.retention_count)
            .await;

        self.step = RestoreStep::Done;
        tracing::info!(
            document_id,
            restored_from = snapshot_id,
            safety_snapshot_id = safety.id,
            user_id = owner_id,
            "Document version restored"
        );

        Ok(RestoreOutcome {
            document,
            safety_snapshot_id: safety.id,
            pruned,
        })
    }

    /// Record a failure at the current step and move to [`RestoreStep::Failed`].
    fn fail(&mut self, error: CoreError) -> RestoreFailure {
        let step = self.step;
        self.step = RestoreStep::Failed;
        tracing::warn!(step = ?step, error = %error, "Restore aborted");
        RestoreFailure { step, error }
    }
}
