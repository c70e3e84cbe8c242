//! Tests for /process endpoint.

mod common;

use axum::http::StatusCode;
use common::{fixtures, TestApp};
use near_white::CLEARED;

#[tokio::test]
async fn test_process_reference_image() {
    let app = TestApp::new();
    app.upload(&[("ref.png", fixtures::reference_png().as_slice())]).await;

    let response = app.process(&["ref.png"], 10).await;

    common::assert_ok(&response);
    let json: serde_json::Value = response.json();
    let result = &json["results"][0];
    assert_eq!(result["filename"], "ref.png");
    assert_eq!(result["success"], true);
    assert_eq!(result["processed"], "ref.png");
    assert_eq!(result["url_original"], "/uploads/ref.png");
    assert_eq!(result["url_processed"], "/processed/ref.png");
    assert!(result.get("error").is_none());

    let bytes = std::fs::read(app.processed_dir().join("ref.png")).unwrap();
    let out = whiteout::rendering::decode_rgba(&bytes).unwrap();
    assert_eq!(
        out.pixels().collect::<Vec<_>>(),
        fixtures::REFERENCE_STRIPPED.to_vec()
    );
}

#[tokio::test]
async fn test_process_archives_original() {
    let app = TestApp::new();
    let png = fixtures::reference_png();
    app.upload(&[("keep.png", png.as_slice())]).await;

    app.process(&["keep.png"], 10).await;

    let archived = std::fs::read(app.archive_dir().join("keep.png")).unwrap();
    assert_eq!(archived, png);
}

#[tokio::test]
async fn test_process_bmp_written_as_png() {
    let app = TestApp::new();
    let bmp = fixtures::bmp_bytes(2, 1, &[[255, 255, 255, 255], [10, 20, 30, 255]]);
    app.upload(&[("scan.bmp", bmp.as_slice())]).await;

    let response = app.process(&["scan.bmp"], 10).await;

    let json: serde_json::Value = response.json();
    assert_eq!(json["results"][0]["success"], true);
    assert_eq!(json["results"][0]["processed"], "scan.png");
    assert!(app.archive_dir().join("scan.bmp").exists());

    let bytes = std::fs::read(app.processed_dir().join("scan.png")).unwrap();
    let out = whiteout::rendering::decode_rgba(&bytes).unwrap();
    assert_eq!(out.get(0, 0), Some(CLEARED));
    assert_eq!(out.get(1, 0), Some([10, 20, 30, 255]));
}

#[tokio::test]
async fn test_process_partial_failure() {
    let app = TestApp::new();
    app.upload(&[("good.png", fixtures::reference_png().as_slice())]).await;

    let response = app.process(&["missing.png", "good.png"], 10).await;

    common::assert_ok(&response);
    let json: serde_json::Value = response.json();
    let results = json["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);

    assert_eq!(results[0]["filename"], "missing.png");
    assert_eq!(results[0]["success"], false);
    assert_eq!(results[0]["error"], "File not found");

    assert_eq!(results[1]["filename"], "good.png");
    assert_eq!(results[1]["success"], true);
}

#[tokio::test]
async fn test_process_undecodable_upload_does_not_abort_batch() {
    let app = TestApp::new();
    let fine = fixtures::reference_png();
    app.upload(&[
        ("broken.png", &b"not really a png"[..]),
        ("fine.png", fine.as_slice()),
    ])
    .await;

    let response = app.process(&["broken.png", "fine.png"], 10).await;

    let json: serde_json::Value = response.json();
    assert_eq!(json["results"][0]["success"], false);
    assert!(json["results"][0]["error"]
        .as_str()
        .unwrap()
        .starts_with("Cannot decode image"));
    assert_eq!(json["results"][1]["success"], true);
    assert!(app.processed_dir().join("fine.png").exists());
    assert!(!app.processed_dir().join("broken.png").exists());
}

#[tokio::test]
async fn test_process_uses_default_tolerance() {
    let app = TestApp::with_config(|c| c.default_tolerance = 30);
    let png = fixtures::png_bytes(1, 1, &[[230, 230, 230, 255]]);
    app.upload(&[("grey.png", png.as_slice())]).await;

    let body = r#"{"files": [{"filename": "grey.png"}]}"#;
    let response = app.post_json("/process", body).await;

    common::assert_ok(&response);
    let bytes = std::fs::read(app.processed_dir().join("grey.png")).unwrap();
    let out = whiteout::rendering::decode_rgba(&bytes).unwrap();
    assert_eq!(out.get(0, 0), Some(CLEARED));
}

#[tokio::test]
async fn test_process_accepts_out_of_range_tolerance() {
    let app = TestApp::new();
    app.upload(&[("ref.png", fixtures::reference_png().as_slice())]).await;

    // Negative tolerance: nothing matches, output equals input
    let response = app.process(&["ref.png"], -20).await;
    common::assert_ok(&response);
    let bytes = std::fs::read(app.processed_dir().join("ref.png")).unwrap();
    let out = whiteout::rendering::decode_rgba(&bytes).unwrap();
    assert_eq!(
        out.pixels().collect::<Vec<_>>(),
        fixtures::REFERENCE_PIXELS.to_vec()
    );

    // Huge tolerance: everything matches
    let response = app.process(&["ref.png"], 5000).await;
    common::assert_ok(&response);
    let bytes = std::fs::read(app.processed_dir().join("ref.png")).unwrap();
    let out = whiteout::rendering::decode_rgba(&bytes).unwrap();
    assert!(out.pixels().all(|px| px == CLEARED));
}

#[tokio::test]
async fn test_process_tolerance_beyond_i32() {
    let app = TestApp::new();
    app.upload(&[("ref.png", fixtures::reference_png().as_slice())]).await;

    let body = r#"{"files": [{"filename": "ref.png"}], "tolerance": 5000000000}"#;
    let response = app.post_json("/process", body).await;
    common::assert_ok(&response);
    let json: serde_json::Value = response.json();
    assert_eq!(json["results"][0]["success"], true);
    let out = common::decode_png(&app.get("/processed/ref.png").await);
    assert!(out.pixels().all(|px| px == CLEARED));

    let body = r#"{"files": [{"filename": "ref.png"}], "tolerance": -5000000000}"#;
    let response = app.post_json("/process", body).await;
    common::assert_ok(&response);
    let out = common::decode_png(&app.get("/processed/ref.png").await);
    assert_eq!(
        out.pixels().collect::<Vec<_>>(),
        fixtures::REFERENCE_PIXELS.to_vec()
    );
}

#[tokio::test]
async fn test_process_without_archive() {
    let app = TestApp::new();
    app.upload(&[("a.png", fixtures::reference_png().as_slice())]).await;

    let body = r#"{"files": [{"filename": "a.png"}], "archive_original": false}"#;
    let response = app.post_json("/process", body).await;

    common::assert_ok(&response);
    assert!(!app.archive_dir().join("a.png").exists());
    assert!(app.processed_dir().join("a.png").exists());
}

#[tokio::test]
async fn test_process_empty_request() {
    let app = TestApp::new();

    let response = app.post_json("/process", "{}").await;

    common::assert_ok(&response);
    let json: serde_json::Value = response.json();
    assert_eq!(json["results"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_process_invalid_json() {
    let app = TestApp::new();

    let response = app.post_json("/process", "not json").await;

    common::assert_json_error(&response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_process_wrong_field_type() {
    let app = TestApp::new();

    let response = app
        .post_json("/process", r#"{"files": "ref.png", "tolerance": "high"}"#)
        .await;

    common::assert_json_error(&response, StatusCode::BAD_REQUEST);
}
