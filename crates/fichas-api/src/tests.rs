//! Router tests against a real filesystem store in a throwaway
//! directory, driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{Duration, NaiveDate, Utc};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt as _;

use fichas_core::{
  Result,
  ficha::FichaId,
  record::SourceRecord,
  store::SourceLoader,
};
use fichas_store_fs::FsStore;

use crate::{AppState, api_router};

/// A canned source sheet.
#[derive(Clone)]
struct FixtureLoader {
  records: Vec<SourceRecord>,
}

impl SourceLoader for FixtureLoader {
  async fn load_records(&self) -> Result<Vec<SourceRecord>> {
    Ok(self.records.clone())
  }
}

fn today() -> NaiveDate { Utc::now().date_naive() }

fn days_ago(n: i64) -> NaiveDate { today() - Duration::days(n) }

/// FICHA-001 had maintenance 100 days ago; FICHA-002 has no date at all;
/// FICHA-003 is fresh.
async fn app() -> (Router, TempDir) {
  let dir = TempDir::new().unwrap();
  let store = FsStore::open(dir.path()).await.unwrap();

  let loader = FixtureLoader {
    records: vec![
      SourceRecord::new(
        FichaId::new("FICHA-001").unwrap(),
        Some(days_ago(100)),
      ),
      SourceRecord::new(FichaId::new("FICHA-002").unwrap(), None),
      SourceRecord::new(
        FichaId::new("FICHA-003").unwrap(),
        Some(days_ago(5)),
      ),
    ],
  };

  let state = AppState {
    loader:            Arc::new(loader),
    store:             Arc::new(store),
    default_threshold: 90,
  };
  (api_router(state), dir)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
  let response = app.clone().oneshot(request).await.unwrap();
  let status = response.status();
  let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
    .await
    .unwrap();
  let value = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, value)
}

fn get(uri: &str) -> Request<Body> {
  Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
  Request::builder()
    .method(method)
    .uri(uri)
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from(body.to_string()))
    .unwrap()
}

// ─── Listing & classification ────────────────────────────────────────────────

#[tokio::test]
async fn listing_classifies_and_preserves_source_order() {
  let (app, _dir) = app().await;
  let (status, body) = send(&app, get("/records")).await;
  assert_eq!(status, StatusCode::OK);

  let records = body.as_array().unwrap();
  let fichas: Vec<_> =
    records.iter().map(|r| r["ficha"].as_str().unwrap()).collect();
  assert_eq!(fichas, ["FICHA-001", "FICHA-002", "FICHA-003"]);

  assert_eq!(records[0]["status"], "overdue");
  assert_eq!(records[0]["days_since"], 100);
  assert_eq!(records[1]["status"], "overdue");
  assert_eq!(records[1]["days_since"], Value::Null);
  assert_eq!(records[2]["status"], "on_time");
}

#[tokio::test]
async fn threshold_is_request_scoped() {
  let (app, _dir) = app().await;
  let (status, body) = send(&app, get("/records?threshold_days=200")).await;
  assert_eq!(status, StatusCode::OK);

  let records = body.as_array().unwrap();
  // 100 days elapsed is inside a 200-day threshold...
  assert_eq!(records[0]["status"], "on_time");
  // ...but a record with no date stays overdue under any threshold.
  assert_eq!(records[1]["status"], "overdue");
}

#[tokio::test]
async fn unknown_ficha_is_404_and_invalid_ficha_is_400() {
  let (app, _dir) = app().await;

  let (status, _) = send(&app, get("/records/FICHA-999")).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  // %5C is a backslash — a path separator in an identifier is rejected
  // before any storage path is formed.
  let (status, body) = send(&app, get("/records/bad%5Cname")).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("separator"));
}

// ─── Metadata edits ──────────────────────────────────────────────────────────

#[tokio::test]
async fn override_turns_overdue_record_on_time() {
  let (app, _dir) = app().await;

  let (status, _) = send(&app, get("/records/FICHA-001")).await;
  assert_eq!(status, StatusCode::OK);

  let patch = json!({ "override_last_maintenance": days_ago(10) });
  let (status, saved) =
    send(&app, json_request("PUT", "/records/FICHA-001/metadata", patch))
      .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(
    saved["override_last_maintenance"].as_str().unwrap(),
    days_ago(10).to_string()
  );

  let (_, record) = send(&app, get("/records/FICHA-001")).await;
  assert_eq!(record["status"], "on_time");
  // The spreadsheet value is still visible alongside the override.
  assert_eq!(
    record["source_last_maintenance"].as_str().unwrap(),
    days_ago(100).to_string()
  );
  assert_eq!(
    record["effective_last_maintenance"].as_str().unwrap(),
    days_ago(10).to_string()
  );
}

#[tokio::test]
async fn explicit_null_clears_the_override() {
  let (app, _dir) = app().await;

  let patch = json!({ "override_last_maintenance": days_ago(10) });
  send(&app, json_request("PUT", "/records/FICHA-001/metadata", patch))
    .await;

  let clear = json!({ "override_last_maintenance": null });
  let (status, saved) =
    send(&app, json_request("PUT", "/records/FICHA-001/metadata", clear))
      .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(saved["override_last_maintenance"], Value::Null);

  let (_, record) = send(&app, get("/records/FICHA-001")).await;
  assert_eq!(record["status"], "overdue");
}

#[tokio::test]
async fn notes_only_patch_preserves_the_override() {
  let (app, _dir) = app().await;

  let patch = json!({ "override_last_maintenance": days_ago(10) });
  send(&app, json_request("PUT", "/records/FICHA-001/metadata", patch))
    .await;

  let notes = json!({ "notes": "cambio de aceite" });
  let (status, saved) =
    send(&app, json_request("PUT", "/records/FICHA-001/metadata", notes))
      .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(saved["notes"], "cambio de aceite");
  assert_eq!(
    saved["override_last_maintenance"].as_str().unwrap(),
    days_ago(10).to_string()
  );
}

// ─── Attachments ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn image_upload_list_open_round_trip() {
  let (app, _dir) = app().await;
  let payload = b"fake jpeg bytes";

  let body = json!({
    "filename": "photo.jpg",
    "data": STANDARD.encode(payload),
  });
  let (status, uploaded) =
    send(&app, json_request("POST", "/records/FICHA-001/images", body))
      .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(uploaded["stored_filename"], "photo.jpg");

  let (status, listing) =
    send(&app, get("/records/FICHA-001/images")).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(listing, json!(["photo.jpg"]));

  let response = app
    .clone()
    .oneshot(get("/records/FICHA-001/images/photo.jpg"))
    .await
    .unwrap();
  assert_eq!(response.status(), StatusCode::OK);
  let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
    .await
    .unwrap();
  assert_eq!(&bytes[..], payload);
}

#[tokio::test]
async fn duplicate_upload_names_get_distinct_stored_names() {
  let (app, _dir) = app().await;

  let upload = |data: &[u8]| {
    json!({ "filename": "img.png", "data": STANDARD.encode(data) })
  };

  let (_, first) =
    send(&app, json_request("POST", "/records/FICHA-001/images", upload(b"one")))
      .await;
  let (_, second) =
    send(&app, json_request("POST", "/records/FICHA-001/images", upload(b"two")))
      .await;

  assert_eq!(first["stored_filename"], "img.png");
  assert_eq!(second["stored_filename"], "img-1.png");

  let (_, listing) = send(&app, get("/records/FICHA-001/images")).await;
  assert_eq!(listing, json!(["img.png", "img-1.png"]));
}

#[tokio::test]
async fn missing_image_is_404_and_bad_base64_is_400() {
  let (app, _dir) = app().await;

  let (status, _) =
    send(&app, get("/records/FICHA-001/images/ghost.jpg")).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let body = json!({ "filename": "x.png", "data": "not base64!!!" });
  let (status, error) =
    send(&app, json_request("POST", "/records/FICHA-001/images", body)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(error["error"].as_str().unwrap().contains("base64"));
}
