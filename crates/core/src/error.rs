use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a missing document.
    pub fn document_not_found(id: DbId) -> Self {
        CoreError::NotFound {
            entity: "Document",
            id,
        }
    }

    /// Shorthand for a missing snapshot. Also used when the snapshot exists
    /// but belongs to another document, so callers cannot tell the two apart.
    pub fn version_not_found(id: DbId) -> Self {
        CoreError::NotFound {
            entity: "DocumentVersion",
            id,
        }
    }
}
