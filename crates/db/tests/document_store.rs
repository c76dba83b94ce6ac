//! Integration tests for `PgDocumentStore` against a real database:
//! - Revision compare-and-swap on update
//! - Owner scoping of document reads
//! - Snapshots scoped to their document
//! - History order with equal `created_at` values
//! - Retention deletes outside the keep set only
//! - Deleting a document cascades to its history

use assert_matches::assert_matches;
use downnote_core::error::CoreError;
use downnote_core::retention::RetentionManager;
use downnote_core::store::{DocumentStore, DocumentUpdate, NewDocument, NewSnapshot};
use downnote_db::PgDocumentStore;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const OWNER: i64 = 1;

fn new_doc(title: &str, body: &str) -> NewDocument {
    NewDocument {
        title: title.to_string(),
        body: body.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_and_scope_by_owner(pool: PgPool) {
    let store = PgDocumentStore::new(pool);
    let doc = store
        .create_document(&new_doc("Notes", "# Notes"), OWNER)
        .await
        .unwrap();

    assert_eq!(doc.revision, 1);
    assert!(store.get_document(doc.id, OWNER).await.unwrap().is_some());
    assert!(store.get_document(doc.id, OWNER + 1).await.unwrap().is_none());
    assert!(store.list_documents(OWNER + 1).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_checks_revision(pool: PgPool) {
    let store = PgDocumentStore::new(pool);
    let doc = store.create_document(&new_doc("A", "v1"), OWNER).await.unwrap();

    let updated = store
        .update_document(
            doc.id,
            &DocumentUpdate {
                body: Some("v2".into()),
                expected_revision: Some(1),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.revision, 2);
    assert_eq!(updated.title, "A");
    assert_eq!(updated.body, "v2");

    let stale = store
        .update_document(
            doc.id,
            &DocumentUpdate {
                body: Some("v3".into()),
                expected_revision: Some(1),
                ..Default::default()
            },
        )
        .await;
    assert_matches!(stale, Err(CoreError::Conflict(_)));

    let missing = store
        .update_document(9_999_999, &DocumentUpdate::default())
        .await;
    assert_matches!(missing, Err(CoreError::NotFound { .. }));
}

// ---------------------------------------------------------------------------
// Versions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_snapshot_is_scoped_to_document(pool: PgPool) {
    let store = PgDocumentStore::new(pool);
    let a = store.create_document(&new_doc("A", ""), OWNER).await.unwrap();
    let b = store.create_document(&new_doc("B", ""), OWNER).await.unwrap();
    let snap = store
        .create_snapshot(b.id, &NewSnapshot::of("B", "hello world"))
        .await
        .unwrap();

    assert_eq!(snap.word_count, 2);
    assert!(store.get_snapshot(a.id, snap.id).await.unwrap().is_none());
    assert!(store.get_snapshot(b.id, snap.id).await.unwrap().is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_snapshot_for_missing_document_is_not_found(pool: PgPool) {
    let store = PgDocumentStore::new(pool);
    let result = store
        .create_snapshot(9_999_999, &NewSnapshot::of("x", "y"))
        .await;
    assert_matches!(result, Err(CoreError::NotFound { entity: "Document", .. }));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_history_order_breaks_ties_by_id(pool: PgPool) {
    let store = PgDocumentStore::new(pool.clone());
    let doc = store.create_document(&new_doc("A", ""), OWNER).await.unwrap();
    for body in ["one", "two", "three"] {
        store
            .create_snapshot(doc.id, &NewSnapshot::of("A", body))
            .await
            .unwrap();
    }
    sqlx::query("UPDATE document_versions SET created_at = '2026-01-01T00:00:00Z'")
        .execute(&pool)
        .await
        .unwrap();

    let history = store.list_snapshots(doc.id).await.unwrap();
    let ids: Vec<_> = history.iter().map(|s| s.id).collect();
    let mut sorted = ids.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(ids, sorted);

    let latest = store.get_latest_snapshot(doc.id).await.unwrap().unwrap();
    assert_eq!(latest.body, "three");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_retention_keeps_newest(pool: PgPool) {
    let store = PgDocumentStore::new(pool);
    let doc = store.create_document(&new_doc("A", ""), OWNER).await.unwrap();
    let other = store.create_document(&new_doc("B", ""), OWNER).await.unwrap();
    let mut ids = Vec::new();
    for i in 0..25 {
        let snap = store
            .create_snapshot(doc.id, &NewSnapshot::of("A", &format!("v{i}")))
            .await
            .unwrap();
        ids.push(snap.id);
    }
    store
        .create_snapshot(other.id, &NewSnapshot::of("B", "keep"))
        .await
        .unwrap();

    let deleted = RetentionManager::new(&store).prune(doc.id, 20).await.unwrap();

    assert_eq!(deleted, 5);
    assert_eq!(store.count_snapshots(doc.id).await.unwrap(), 20);
    assert_eq!(store.count_snapshots(other.id).await.unwrap(), 1);
    for old in &ids[..5] {
        assert!(store.get_snapshot(doc.id, *old).await.unwrap().is_none());
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_cascades_history(pool: PgPool) {
    let store = PgDocumentStore::new(pool);
    let doc = store.create_document(&new_doc("A", ""), OWNER).await.unwrap();
    store
        .create_snapshot(doc.id, &NewSnapshot::of("A", "v"))
        .await
        .unwrap();

    assert!(store.delete_document(doc.id).await.unwrap());
    assert!(!store.delete_document(doc.id).await.unwrap());
    assert_eq!(store.count_snapshots(doc.id).await.unwrap(), 0);
}
