//! Database row structs.
//!
//! Each submodule holds a `FromRow` struct matching one table's columns and
//! the conversion into the matching `downnote_core::store` entity.

pub mod document;
pub mod document_version;
