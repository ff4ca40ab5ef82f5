//! Integration tests for skumap-link API endpoints
//!
//! Tests cover:
//! - Health endpoint
//! - Table listing and paginated/sorted table viewing
//! - Search, selection, stage, commit and export round trip
//! - Error bodies for empty searches, stale previews and bad input

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::{json, Value};
use skumap_common::db::init_database;
use skumap_common::CatalogStore;
use skumap_link::ingest::{ingest_all, FeedSources};
use skumap_link::{build_router, AppState};
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method

const POS_FEED: &[u8] = b"POS export\n\n123,Widget,9.99\n456,Gadget,5.00\n1120,Widget Mini,4.00\n";
const WEB_FEED: &str = "sku,name,price\nW1,Widget Pro,9.99\nW2,Gadget Max,5.50\n";

/// Test helper: ingest sample feeds into a throwaway database
async fn setup_state() -> (TempDir, AppState) {
    let dir = TempDir::new().unwrap();
    let feeds = FeedSources {
        pos_feed: dir.path().join("POSsample.csv"),
        web_feed: dir.path().join("WEBsample.csv"),
        pos_skip_rows: 2,
    };
    std::fs::write(&feeds.pos_feed, POS_FEED).unwrap();
    std::fs::write(&feeds.web_feed, WEB_FEED).unwrap();

    let store = CatalogStore::new(init_database(&dir.path().join("skus.db")).await.unwrap());
    ingest_all(&store, &feeds).await.unwrap();

    let export_path = dir.path().join("sku2sku.csv");
    let state = AppState::new(store, feeds, export_path).await.unwrap();
    (dir, state)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Send one request through a fresh router over the shared state
async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = build_router(state.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    (status, bytes.to_vec())
}

async fn send_json(state: &AppState, request: Request<Body>) -> (StatusCode, Value) {
    let (status, bytes) = send(state, request).await;
    (status, serde_json::from_slice(&bytes).expect("Should parse JSON"))
}

// =============================================================================
// Health and table browsing
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (_dir, state) = setup_state().await;
    let (status, body) = send_json(&state, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "skumap-link");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_list_tables_with_counts() {
    let (_dir, state) = setup_state().await;
    let (status, body) = send_json(&state, get("/api/tables")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["name"], "POS");
    assert_eq!(body[0]["row_count"], 3);
    assert_eq!(body[3]["name"], "MERGED");
}

#[tokio::test]
async fn test_table_viewing_sorted() {
    let (_dir, state) = setup_state().await;
    let (status, body) = send_json(&state, get("/api/table/pos?sort=PRICE_P&order=desc")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["table_name"], "POS");
    assert_eq!(body["page_size"], 100);
    assert_eq!(body["total_rows"], 3);
    assert_eq!(body["columns"], json!(["SKU_P", "NAME_P", "PRICE_P", "USE_P"]));
    assert_eq!(body["rows"][0][0], "123");
    assert_eq!(body["rows"][2][0], "1120");
}

#[tokio::test]
async fn test_table_rejects_unknown_names() {
    let (_dir, state) = setup_state().await;

    let (status, body) = send_json(&state, get("/api/table/sqlite_master")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let (status, _) = send_json(&state, get("/api/table/POS?sort=NAME_W")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Search and selection
// =============================================================================

#[tokio::test]
async fn test_identifier_search_narrows_view() {
    let (_dir, state) = setup_state().await;

    let request = post("/api/search/pos/identifier", json!({"substring": "12"}));
    let (status, body) = send_json(&state, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rows"].as_array().unwrap().len(), 2);

    // The narrowed view persists across requests
    let (_, view) = send_json(&state, get("/api/view/pos")).await;
    assert_eq!(view["rows"][1]["identifier"], "1120");
}

#[tokio::test]
async fn test_empty_search_error_body() {
    let (_dir, state) = setup_state().await;

    let request = post("/api/search/web/name", json!({"terms": ["", ""]}));
    let (status, body) = send_json(&state, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "EMPTY_SEARCH");
    assert_eq!(body["error"]["retryable"], false);

    let (status, body) = send_json(&state, post("/api/search/pos/identifier", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "No bar code entered");
}

#[tokio::test]
async fn test_unknown_side_rejected() {
    let (_dir, state) = setup_state().await;
    let (status, _) = send_json(&state, get("/api/view/merged")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_select_out_of_range_is_not_found() {
    let (_dir, state) = setup_state().await;
    let (status, body) = send_json(&state, post("/api/select/web", json!({"row_index": 9}))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

// =============================================================================
// Stage, commit, export
// =============================================================================

#[tokio::test]
async fn test_full_round_trip() {
    let (dir, state) = setup_state().await;

    send_json(&state, post("/api/select/pos", json!({"row_index": 0}))).await;
    let (_, buffer) = send_json(&state, post("/api/select/web", json!({"row_index": 0}))).await;
    assert_eq!(buffer["fields"]["pos_identifier"], "123");
    assert_eq!(buffer["fields"]["web_identifier"], "W1");
    assert_eq!(buffer["phase"], "idle");

    let (status, preview) = send_json(&state, post("/api/stage", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(preview["rows"][0]["web_name"], "Widget Pro");

    let (status, receipt) = send_json(&state, post("/api/commit", preview.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(receipt["merged_ids"].as_array().unwrap().len(), 1);

    let (_, merged) = send_json(&state, get("/api/merged")).await;
    assert_eq!(merged[0]["pos_sku"], "123");
    assert_eq!(merged[0]["id"], receipt["merged_ids"][0]);

    let (status, csv) = send(&state, get("/api/export")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8(csv).unwrap(), "W1,123\n");

    let (status, summary) = send_json(&state, post("/api/export", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["rows"], 1);
    assert_eq!(std::fs::read_to_string(dir.path().join("sku2sku.csv")).unwrap(), "W1,123\n");
}

#[tokio::test]
async fn test_stage_with_empty_buffer_conflicts() {
    let (_dir, state) = setup_state().await;
    let (status, body) = send_json(&state, post("/api/stage", json!({}))).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "EMPTY_PAIRING");
}

#[tokio::test]
async fn test_commit_of_stale_preview_conflicts() {
    let (_dir, state) = setup_state().await;

    send_json(&state, post("/api/select/pos", json!({"row_index": 0}))).await;
    let (_, reviewed) = send_json(&state, post("/api/stage", json!({}))).await;

    send_json(&state, post("/api/select/pos", json!({"row_index": 1}))).await;
    send_json(&state, post("/api/stage", json!({}))).await;

    let (status, body) = send_json(&state, post("/api/commit", reviewed)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "STALE_PREVIEW");

    let (_, merged) = send_json(&state, get("/api/merged")).await;
    assert!(merged.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_commit_echoed_preview_with_long_price() {
    let (_dir, state) = setup_state().await;
    std::fs::write(&state.feeds.pos_feed, b"POS export\n\n777,Odd Price,19.706038696946806\n").unwrap();
    send_json(&state, post("/api/ingest", json!({}))).await;

    send_json(&state, post("/api/select/pos", json!({"row_index": 0}))).await;
    let (_, reviewed) = send_json(&state, post("/api/stage", json!({}))).await;
    assert_eq!(reviewed["revision"].as_str().unwrap().len(), 64);

    let (status, receipt) = send_json(&state, post("/api/commit", reviewed)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(receipt["merged_ids"].as_array().unwrap().len(), 1);

    let (_, merged) = send_json(&state, get("/api/merged")).await;
    assert_eq!(merged[0]["pos_sku"], "777");
}

#[tokio::test]
async fn test_duplicate_review_after_replayed_commit() {
    let (_dir, state) = setup_state().await;

    send_json(&state, post("/api/select/pos", json!({"row_index": 0}))).await;
    let (_, reviewed) = send_json(&state, post("/api/stage", json!({}))).await;
    send_json(&state, post("/api/commit", reviewed.clone())).await;
    send_json(&state, post("/api/commit", reviewed)).await;

    let (status, body) = send_json(&state, get("/api/review/duplicates")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["side"], "pos");
    assert_eq!(body[0]["identifier"], "123");
    assert_eq!(body[0]["merged_ids"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_reingest_refreshes_views() {
    let (_dir, state) = setup_state().await;
    std::fs::write(&state.feeds.web_feed, "sku,name,price\nW7,New Thing,1.00\n").unwrap();

    let (status, report) = send_json(&state, post("/api/ingest", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["web"]["kept"], 1);

    let (_, view) = send_json(&state, get("/api/view/web")).await;
    assert_eq!(view["rows"][0]["identifier"], "W7");
}
