//! Versioning core for DownNote documents.
//!
//! Pure policy (snapshot decisions, content stats, title extraction), the
//! collaborator traits the services consume, and the services themselves:
//! edit-with-snapshot, retention, restore and guest migration.

pub mod content_stats;
pub mod error;
pub mod guest;
pub mod memory;
pub mod migration;
pub mod restore;
pub mod retention;
pub mod store;
pub mod title;
pub mod types;
pub mod version_policy;
pub mod versioning;
