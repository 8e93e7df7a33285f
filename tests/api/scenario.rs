//! End-to-end flows across several endpoints

use axum::http::StatusCode;
use serde_json::json;

#[path = "../common/mod.rs"]
mod common;
use common::*;

fn activate_body(site_hash: &str) -> serde_json::Value {
    json!({
        "key": "KEY-SOLO",
        "site_url": format!("https://{}.example.com", site_hash),
        "site_hash": site_hash
    })
}

/// A single-seat license moves from one site to another.
#[tokio::test]
async fn test_single_seat_license_moves_between_sites() {
    let (state, _kv, _blobs) = create_test_app_state();
    {
        let conn = state.db.get().unwrap();
        create_test_license(&conn, "KEY-SOLO", 1, Some(future_timestamp(ONE_YEAR)));
    }
    let app = app(state);

    let (status, _) = post_json(app.clone(), "/v1/licenses/activate", activate_body("site-a")).await;
    assert_eq!(status, StatusCode::OK, "first site should activate");

    let (status, body) = post_json(app.clone(), "/v1/licenses/activate", activate_body("site-b")).await;
    assert_eq!(status, StatusCode::CONFLICT, "second site should hit the limit");
    assert_eq!(body["reason"], "limit_exceeded");
    assert_eq!(body["max"], 1);

    let (status, _) = post_json(
        app.clone(),
        "/v1/licenses/deactivate",
        json!({ "key": "KEY-SOLO", "site_hash": "site-a" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = post_json(app.clone(), "/v1/licenses/activate", activate_body("site-b")).await;
    assert_eq!(status, StatusCode::OK, "freed seat should accept the second site");

    let (_, body) = get(app.clone(), "/v1/licenses/validate?key=KEY-SOLO&site_hash=site-a").await;
    assert_eq!(body, json!({ "valid": false, "reason": "not_activated" }));

    let (_, body) = get(app, "/v1/licenses/validate?key=KEY-SOLO&site_hash=site-b").await;
    assert_eq!(body["valid"], true);
}

/// Activate, find an update, download it, then lose access after deactivation.
#[tokio::test]
async fn test_activate_update_download_flow() {
    let (state, _kv, blobs) = create_test_app_state();
    {
        let conn = state.db.get().unwrap();
        create_test_license(&conn, "KEY-SOLO", 1, None);
        create_test_release(&conn, TEST_SLUG, "2.0.0", now());
    }
    blobs
        .insert(&artifact_key(TEST_SLUG, "2.0.0"), &b"zip bytes"[..], None)
        .unwrap();
    let app = app(state);

    let check = format!(
        "/v1/updates/check?slug={}&version=1.0.0&key=KEY-SOLO&site_hash=site-a",
        TEST_SLUG
    );

    let (_, body) = get(app.clone(), &check).await;
    assert_eq!(body["has_update"], false, "inactive site gets no update");

    post_json(app.clone(), "/v1/licenses/activate", activate_body("site-a")).await;

    let (_, body) = get(app.clone(), &check).await;
    assert_eq!(body["has_update"], true);
    let token = token_from_url(body["download_url"].as_str().unwrap());

    let download = format!("/v1/updates/download?token={}", token);
    let response = tower::ServiceExt::oneshot(
        app.clone(),
        axum::http::Request::builder()
            .uri(&download)
            .body(axum::body::Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"zip bytes");

    post_json(
        app.clone(),
        "/v1/licenses/deactivate",
        json!({ "key": "KEY-SOLO", "site_hash": "site-a" }),
    )
    .await;

    let (_, body) = get(app, &check).await;
    assert_eq!(body["has_update"], false, "deactivated site gets no new tokens");
}
