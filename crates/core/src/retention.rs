//! Snapshot retention.
//!
//! Keeps at most `retention_count` snapshots per document, deleting the
//! oldest excess. The newest are determined by the store's total order
//! `(created_at, id)`, so ties on `created_at` keep the later insert.

use crate::error::CoreError;
use crate::store::DocumentStore;
use crate::types::DbId;

/// Enforces the per-document snapshot limit.
pub struct RetentionManager<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> RetentionManager<'a> {
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Delete every snapshot of `document_id` outside the newest
    /// `retention_count`. Returns the number deleted. Idempotent.
    pub async fn prune(&self, document_id: DbId, retention_count: usize) -> Result<u64, CoreError> {
        let count = self.store.count_snapshots(document_id).await?;
        let limit = i64::try_from(retention_count).unwrap_or(i64::MAX);
        if count <= limit {
            return Ok(0);
        }

        let keep_ids = self
            .store
            .list_snapshot_ids_newest_first(document_id, limit)
            .await?;

        // A racing delete can leave no ids at all; an empty keep set only
        // means "delete everything" when that was asked for.
        if keep_ids.is_empty() && limit > 0 {
            return Ok(0);
        }

        let deleted = self
            .store
            .delete_snapshots_except(document_id, &keep_ids)
            .await?;

        tracing::debug!(
            document_id,
            kept = keep_ids.len(),
            deleted,
            "Pruned document versions"
        );
        Ok(deleted)
    }

    /// [`prune`](Self::prune), logging failures instead of returning them.
    ///
    /// Returns `None` when pruning failed.
    pub async fn prune_best_effort(&self, document_id: DbId, retention_count: usize) -> Option<u64> {
        match self.prune(document_id, retention_count).await {
            Ok(deleted) => Some(deleted),
            Err(e) => {
                tracing::warn!(
                    document_id,
                    retention_count,
                    error = %e,
                    "Failed to prune document versions"
                );
                None
            }
        }
    }
}
