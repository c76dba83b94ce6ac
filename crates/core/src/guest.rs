//! Anonymous (guest) document storage.
//!
//! Guest documents live in a client-local scope with no account linkage.
//! The persisted layout is a single JSON array of
//! `{id, title, body, createdAt, updatedAt}` records, newest `updatedAt`
//! first; export and import round-trip that shape.
//!
//! [`GuestLibrary`] is the plain value; [`GuestScope`] is the shareable
//! handle that implements [`LocalStore`] for the migration service.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::store::LocalStore;
use crate::title::UNTITLED_DOCUMENT;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Body given to guest documents created without content.
pub const DEFAULT_GUEST_BODY: &str = "# Untitled Document\n\nStart writing...";

/// Typical browser local-storage quota.
pub const LOCAL_STORAGE_QUOTA_BYTES: usize = 5 * 1024 * 1024;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 9;

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// A document stored in an anonymous scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalDocument {
    pub id: String,
    pub title: String,
    /// Older exports call this field `content`.
    #[serde(alias = "content")]
    pub body: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Partial update of a guest document.
#[derive(Debug, Clone, Default)]
pub struct LocalDocumentUpdate {
    pub title: Option<String>,
    pub body: Option<String>,
}

/// Storage usage of a guest library.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StorageInfo {
    pub used_bytes: usize,
    pub total_bytes: usize,
    pub percentage: f64,
    pub document_count: usize,
}

// ---------------------------------------------------------------------------
// Library
// ---------------------------------------------------------------------------

/// Ordered guest document list, newest `updated_at` first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuestLibrary {
    documents: Vec<LocalDocument>,
}

impl GuestLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a library from records, restoring the newest-first order.
    pub fn from_documents(mut documents: Vec<LocalDocument>) -> Self {
        documents.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Self { documents }
    }

    pub fn documents(&self) -> &[LocalDocument] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&LocalDocument> {
        self.documents.iter().find(|d| d.id == id)
    }

    /// Create a document at the front of the list.
    pub fn create(&mut self, title: Option<&str>, body: Option<&str>) -> LocalDocument {
        let now = Utc::now();
        let doc = LocalDocument {
            id: generate_guest_id(now),
            title: title
                .filter(|t| !t.is_empty())
                .unwrap_or(UNTITLED_DOCUMENT)
                .to_string(),
            body: body
                .filter(|b| !b.is_empty())
                .unwrap_or(DEFAULT_GUEST_BODY)
                .to_string(),
            created_at: now,
            updated_at: now,
        };
        self.documents.insert(0, doc.clone());
        doc
    }

    /// Apply `update` and move the document to the front. `None` if absent.
    pub fn update(&mut self, id: &str, update: LocalDocumentUpdate) -> Option<LocalDocument> {
        let index = self.documents.iter().position(|d| d.id == id)?;
        let mut doc = self.documents.remove(index);
        if let Some(title) = update.title {
            doc.title = title;
        }
        if let Some(body) = update.body {
            doc.body = body;
        }
        doc.updated_at = Utc::now();
        self.documents.insert(0, doc.clone());
        Some(doc)
    }

    /// Remove a document. Returns `false` if it did not exist.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.documents.len();
        self.documents.retain(|d| d.id != id);
        self.documents.len() != before
    }

    pub fn clear(&mut self) {
        self.documents.clear();
    }

    /// Pretty-printed JSON array of all documents.
    pub fn export_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(&self.documents)
            .map_err(|e| CoreError::Internal(format!("Failed to export guest documents: {e}")))
    }

    /// Replace the library with the valid records of `json`.
    ///
    /// Malformed records are dropped. Fails, leaving the library untouched,
    /// if `json` is not an array or holds no valid record. Returns the number
    /// of records imported.
    pub fn import_json(&mut self, json: &str) -> Result<usize, CoreError> {
        let documents = parse_export(json)?;
        if documents.is_empty() {
            return Err(CoreError::Validation(
                "No valid documents found in import".to_string(),
            ));
        }
        let count = documents.len();
        *self = Self::from_documents(documents);
        Ok(count)
    }

    pub fn storage_info(&self) -> StorageInfo {
        let used_bytes = serde_json::to_string(&self.documents)
            .map(|s| s.len())
            .unwrap_or(0);
        StorageInfo {
            used_bytes,
            total_bytes: LOCAL_STORAGE_QUOTA_BYTES,
            percentage: used_bytes as f64 / LOCAL_STORAGE_QUOTA_BYTES as f64 * 100.0,
            document_count: self.documents.len(),
        }
    }
}

/// Parse a guest export payload, keeping only well-formed records.
///
/// A record is well-formed when it deserializes with all five fields and has
/// a non-empty `id` and `title`.
pub fn parse_export(json: &str) -> Result<Vec<LocalDocument>, CoreError> {
    let value: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| CoreError::Validation(format!("Invalid guest export JSON: {e}")))?;
    parse_export_value(value)
}

/// [`parse_export`] for an already-decoded JSON value.
pub fn parse_export_value(value: serde_json::Value) -> Result<Vec<LocalDocument>, CoreError> {
    let serde_json::Value::Array(records) = value else {
        return Err(CoreError::Validation(
            "Guest export must be a JSON array".to_string(),
        ));
    };

    let total = records.len();
    let valid: Vec<LocalDocument> = records
        .into_iter()
        .filter_map(|record| serde_json::from_value::<LocalDocument>(record).ok())
        .filter(|doc| !doc.id.is_empty() && !doc.title.is_empty())
        .collect();

    if total > 0 && valid.is_empty() {
        return Err(CoreError::Validation(
            "No valid documents found in guest export".to_string(),
        ));
    }
    Ok(valid)
}

fn generate_guest_id(now: Timestamp) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("guest-{}-{suffix}", now.timestamp_millis())
}

// ---------------------------------------------------------------------------
// Shared scope
// ---------------------------------------------------------------------------

/// Shareable handle to one guest library.
#[derive(Debug, Default)]
pub struct GuestScope {
    library: Mutex<GuestLibrary>,
}

impl GuestScope {
    pub fn new(library: GuestLibrary) -> Self {
        Self {
            library: Mutex::new(library),
        }
    }

    /// Copy of the current library contents.
    pub fn snapshot(&self) -> Result<GuestLibrary, CoreError> {
        self.library
            .lock()
            .map(|lib| lib.clone())
            .map_err(|_| CoreError::Internal("Guest scope lock poisoned".to_string()))
    }
}

#[async_trait]
impl LocalStore for GuestScope {
    async fn list(&self) -> Result<Vec<LocalDocument>, CoreError> {
        Ok(self.snapshot()?.documents)
    }

    async fn clear(&self) -> Result<(), CoreError> {
        self.library
            .lock()
            .map(|mut lib| lib.clear())
            .map_err(|_| CoreError::Internal("Guest scope lock poisoned".to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
