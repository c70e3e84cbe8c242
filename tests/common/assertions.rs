//! Assertion helpers for tests.

use axum::http::StatusCode;
use near_white::RgbaBuffer;
use pretty_assertions::assert_eq;

use super::app::TestResponse;

/// Assert response has expected status code
pub fn assert_status(response: &TestResponse, expected: StatusCode) {
    assert_eq!(
        response.status,
        expected,
        "Expected status {}, got {}. Body: {}",
        expected,
        response.status,
        response.text()
    );
}

/// Assert response is OK (200)
pub fn assert_ok(response: &TestResponse) {
    assert_status(response, StatusCode::OK);
}

/// Assert response is a valid PNG image
pub fn assert_png(response: &TestResponse) {
    assert_ok(response);
    assert!(
        response.is_png(),
        "Expected PNG image, got {} bytes starting with {:?}",
        response.body.len(),
        &response.body[..8.min(response.body.len())]
    );
    assert_eq!(
        response.header("content-type"),
        Some("image/png"),
        "Expected Content-Type: image/png"
    );
}

/// Assert JSON error body carries the expected status field
pub fn assert_json_error(response: &TestResponse, expected: StatusCode) {
    assert_status(response, expected);
    let json: serde_json::Value = response.json();
    assert_eq!(json["status"].as_u64(), Some(expected.as_u16() as u64));
    assert!(json["error"].is_string(), "Expected error message");
}

/// Decode a PNG response body into RGBA pixels
pub fn decode_png(response: &TestResponse) -> RgbaBuffer {
    whiteout::rendering::decode_rgba(response.bytes()).expect("Response is not a decodable image")
}

/// Names of the entries in a zip response, in archive order
pub fn zip_entry_names(response: &TestResponse) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(response.body.clone()))
        .expect("Response is not a zip archive");
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}
