//! HTTP-level tests for history listing, snapshot fetch and restore.

mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use common::{body_json, build_test_app, get, patch_json, post, post_json, send_as, OTHER_USER};
use downnote_core::store::{DocumentStore, NewSnapshot};
use serde_json::json;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Create a document and return its id.
async fn create(app: axum::Router, body: &str) -> i64 {
    let response = post_json(app, "/api/v1/documents", json!({ "body": body })).await;
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

#[tokio::test]
async fn history_is_newest_first_without_bodies() {
    let (app, store) = build_test_app();
    let id = create(app.clone(), "").await;
    store
        .insert_snapshot_at(id, &NewSnapshot::of("old", "old body"), Utc::now() - Duration::hours(2))
        .unwrap();
    store
        .insert_snapshot_at(id, &NewSnapshot::of("new", "new body"), Utc::now() - Duration::hours(1))
        .unwrap();

    let response = get(app, &format!("/api/v1/documents/{id}/versions")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let items = json["data"].as_array().unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["title"], "new");
    assert_eq!(items[1]["title"], "old");
    assert!(items[0].get("body").is_none());
    assert_eq!(items[0]["word_count"], 2);
}

#[tokio::test]
async fn slow_edit_snapshots_after_time_threshold() {
    let (app, store) = build_test_app();
    let id = create(app.clone(), "").await;
    let base = "a".repeat(500);
    store
        .insert_snapshot_at(id, &NewSnapshot::of("t", &base), Utc::now() - Duration::minutes(6))
        .unwrap();

    let response = patch_json(
        app,
        &format!("/api/v1/documents/{id}"),
        json!({ "body": "a".repeat(550) }),
    )
    .await;
    let json = body_json(response).await;

    assert_eq!(json["data"]["decision"]["reason"], "time_threshold");
    assert_eq!(store.count_snapshots(id).await.unwrap(), 2);
}

#[tokio::test]
async fn version_of_other_document_is_404() {
    let (app, store) = build_test_app();
    let a = create(app.clone(), "a").await;
    let b = create(app.clone(), "b").await;
    let foreign = store
        .create_snapshot(b, &NewSnapshot::of("b", "b body"))
        .await
        .unwrap();

    let response = get(app.clone(), &format!("/api/v1/documents/{a}/versions/{}", foreign.id)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(app, &format!("/api/v1/documents/{b}/versions/{}", foreign.id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["body"], "b body");
}

// ---------------------------------------------------------------------------
// Restore
// ---------------------------------------------------------------------------

#[tokio::test]
async fn restore_saves_current_state_first() {
    let (app, store) = build_test_app();
    let id = create(app.clone(), "# Draft\ncurrent").await;
    let target = store
        .insert_snapshot_at(
            id,
            &NewSnapshot::of("Original", "# Original\nfirst words"),
            Utc::now() - Duration::days(1),
        )
        .unwrap();

    let response = post(
        app.clone(),
        &format!("/api/v1/documents/{id}/versions/{}/restore", target.id),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    assert_eq!(json["data"]["document"]["title"], "Original");
    assert_eq!(json["data"]["document"]["body"], "# Original\nfirst words");
    let safety_id = json["data"]["safety_snapshot_id"].as_i64().unwrap();

    let safety = body_json(
        get(app, &format!("/api/v1/documents/{id}/versions/{safety_id}")).await,
    )
    .await;
    assert_eq!(safety["data"]["title"], "Draft");
    assert_eq!(safety["data"]["body"], "# Draft\ncurrent");
    assert_eq!(store.count_snapshots(id).await.unwrap(), 2);
}

#[tokio::test]
async fn restore_with_foreign_version_changes_nothing() {
    let (app, store) = build_test_app();
    let a = create(app.clone(), "a body").await;
    let b = create(app.clone(), "b body").await;
    let foreign = store
        .create_snapshot(b, &NewSnapshot::of("b", "b history"))
        .await
        .unwrap();

    let response = post(
        app.clone(),
        &format!("/api/v1/documents/{a}/versions/{}/restore", foreign.id),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["step"], "idle");

    assert_eq!(store.count_snapshots(a).await.unwrap(), 0);
    let current = body_json(get(app, &format!("/api/v1/documents/{a}")).await).await;
    assert_eq!(current["data"]["body"], "a body");
}

#[tokio::test]
async fn restore_by_other_user_is_404() {
    let (app, store) = build_test_app();
    let id = create(app.clone(), "mine").await;
    let snap = store
        .create_snapshot(id, &NewSnapshot::of("t", "old"))
        .await
        .unwrap();

    let response = send_as(
        app,
        OTHER_USER,
        Method::POST,
        &format!("/api/v1/documents/{id}/versions/{}/restore", snap.id),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(store.count_snapshots(id).await.unwrap(), 1);
}

#[tokio::test]
async fn restore_respects_retention() {
    let (app, store) = build_test_app();
    let id = create(app.clone(), "now").await;
    let mut oldest = None;
    for i in 0..20 {
        let snap = store
            .insert_snapshot_at(
                id,
                &NewSnapshot::of("t", &format!("v{i}")),
                Utc::now() - Duration::minutes(100 - i),
            )
            .unwrap();
        oldest.get_or_insert(snap.id);
    }

    let response = post(
        app,
        &format!("/api/v1/documents/{id}/versions/{}/restore", oldest.unwrap()),
    )
    .await;
    let json = body_json(response).await;

    assert_eq!(json["data"]["pruned"], 1);
    assert_eq!(store.count_snapshots(id).await.unwrap(), 20);
}
