//! Tests for GET /v1/prompts

use axum::http::StatusCode;
use gatepost::storage::KvStore;
use serde_json::json;

#[path = "../common/mod.rs"]
mod common;
use common::*;

#[tokio::test]
async fn test_prompts_defaults_to_common_v1() {
    let (state, kv, _blobs) = create_test_app_state();
    kv.put("prompts:v1:common", &json!([{ "id": "intro", "text": "Hello" }]))
        .await
        .unwrap();

    let (status, body) = get(app(state), "/v1/prompts").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "section": "common",
            "version": "v1",
            "data": [{ "id": "intro", "text": "Hello" }]
        })
    );
}

#[tokio::test]
async fn test_prompts_selects_section_and_version() {
    let (state, kv, _blobs) = create_test_app_state();
    kv.put("prompts:v2:checkout", &json!({ "headline": "Pay now" }))
        .await
        .unwrap();
    kv.put("prompts:v1:checkout", &json!({ "headline": "Old" }))
        .await
        .unwrap();

    let (status, body) = get(app(state), "/v1/prompts?section=checkout&version=v2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["section"], "checkout");
    assert_eq!(body["version"], "v2");
    assert_eq!(body["data"], json!({ "headline": "Pay now" }));
}

#[tokio::test]
async fn test_prompts_missing_entry_returns_empty_array() {
    let (state, _kv, _blobs) = create_test_app_state();

    let (status, body) = get(app(state), "/v1/prompts?section=nothing-here").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["section"], "nothing-here");
    assert_eq!(body["version"], "v1");
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_prompts_empty_selectors_use_defaults() {
    let (state, kv, _blobs) = create_test_app_state();
    kv.put("prompts:v1:common", &json!(["a"])).await.unwrap();

    let (status, body) = get(app(state), "/v1/prompts?section=&version=").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["section"], "common");
    assert_eq!(body["data"], json!(["a"]));
}
