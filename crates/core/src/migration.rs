//! Guest document migration.
//!
//! On the first authenticated session, documents created anonymously are
//! copied into the account-backed store. Unmodified onboarding documents are
//! skipped. The local scope is cleared only when every document made it
//! across; on partial failure it is left intact so nothing is lost.
//!
//! Retries are not deduplicated: a second run re-creates everything still in
//! the local scope. [`MigrationResult::migrated_local_ids`] lets the caller
//! drop the documents that already made it before retrying.

use serde::Serialize;

use crate::guest::LocalDocument;
use crate::store::{DocumentStore, LocalStore};
use crate::types::DbId;
use crate::versioning::{create_document_in, CreateDocument};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Title of the auto-generated onboarding document.
pub const WELCOME_TITLE: &str = "Welcome to DownNote";

/// Canonical first line of the onboarding document body.
pub const WELCOME_BODY_PREFIX: &str = "# Welcome to DownNote!";

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// Outcome of a migration run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationResult {
    /// `true` only when no document failed.
    pub success: bool,
    pub migrated_count: usize,
    pub errors: Vec<String>,
    /// Onboarding documents left out.
    pub skipped_count: usize,
    /// Local ids of the documents created in the account store.
    pub migrated_local_ids: Vec<String>,
}

impl MigrationResult {
    fn succeeded() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }
}

/// Whether `doc` is the untouched onboarding document.
pub fn is_default_welcome(doc: &LocalDocument) -> bool {
    doc.title == WELCOME_TITLE && doc.body.starts_with(WELCOME_BODY_PREFIX)
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Copies guest documents into an account.
pub struct MigrationService<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> MigrationService<'a> {
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Migrate every document in `local` into `owner_id`'s account.
    ///
    /// Never returns an error: failures are reported in the result.
    pub async fn migrate(&self, owner_id: DbId, local: &dyn LocalStore) -> MigrationResult {
        let documents = match local.list().await {
            Ok(docs) => docs,
            Err(e) => {
                tracing::error!(user_id = owner_id, error = %e, "Failed to read guest documents");
                return MigrationResult {
                    success: false,
                    errors: vec![format!("Migration failed: {e}")],
                    ..MigrationResult::default()
                };
            }
        };

        if documents.is_empty() {
            return MigrationResult::succeeded();
        }

        let total = documents.len();
        let pending: Vec<LocalDocument> = documents
            .into_iter()
            .filter(|doc| !is_default_welcome(doc))
            .collect();

        let mut result = MigrationResult {
            skipped_count: total - pending.len(),
            ..MigrationResult::succeeded()
        };

        for doc in &pending {
            let input = CreateDocument {
                title: Some(doc.title.clone()),
                body: Some(doc.body.clone()),
            };
            match create_document_in(self.store, owner_id, input).await {
                Ok(created) => {
                    tracing::debug!(
                        local_id = %doc.id,
                        document_id = created.id,
                        "Guest document migrated"
                    );
                    result.migrated_count += 1;
                    result.migrated_local_ids.push(doc.id.clone());
                }
                Err(e) => {
                    tracing::warn!(local_id = %doc.id, error = %e, "Guest document migration failed");
                    result
                        .errors
                        .push(format!("Failed to migrate \"{}\" ({}): {e}", doc.title, doc.id));
                }
            }
        }

        if result.errors.is_empty() {
            if let Err(e) = local.clear().await {
                tracing::error!(user_id = owner_id, error = %e, "Failed to clear guest documents");
                result
                    .errors
                    .push(format!("Migrated documents but failed to clear guest storage: {e}"));
            }
        }
        result.success = result.errors.is_empty();

        tracing::info!(
            user_id = owner_id,
            migrated = result.migrated_count,
            skipped = result.skipped_count,
            failed = pending.len() - result.migrated_count,
            "Guest migration finished"
        );
        result
    }
}
