//! Test application factory for integration tests.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tower::ServiceExt;

use whiteout::models::AppConfig;
use whiteout::server::{build_router, create_app_state, AppState};

const BOUNDARY: &str = "whiteout-test-boundary";

/// Test application with router and a private working directory
pub struct TestApp {
    router: axum::Router,
    pub state: AppState,
    // Dropped last; removes all uploaded and processed files
    root: TempDir,
}

impl TestApp {
    /// Create a new test application rooted in a fresh temp directory
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Create a test application after adjusting the default configuration
    pub fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let root = tempfile::tempdir().expect("Failed to create temp dir");
        let mut config = AppConfig::rooted_at(root.path());
        adjust(&mut config);

        let state = create_app_state(config).expect("Failed to create app state");
        let router = build_router(state.clone());

        Self {
            router,
            state,
            root,
        }
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.state.config.upload_dir.clone()
    }

    pub fn archive_dir(&self) -> PathBuf {
        self.state.config.archive_dir.clone()
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.state.config.processed_dir.clone()
    }

    /// Make a GET request to the given path
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(Request::get(path).body(Body::empty()).unwrap())
            .await
    }

    /// Make a POST request with JSON body
    pub async fn post_json(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::post(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.request(request).await
    }

    /// POST a multipart form where each entry is `(field, filename, bytes)`
    pub async fn post_multipart(&self, path: &str, parts: &[(&str, &str, &[u8])]) -> TestResponse {
        let mut body = Vec::new();
        for (field, filename, bytes) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::post(path)
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        self.request(request).await
    }

    /// Upload files under the `files` field
    pub async fn upload(&self, files: &[(&str, &[u8])]) -> TestResponse {
        let parts: Vec<(&str, &str, &[u8])> = files
            .iter()
            .map(|(name, bytes)| ("files", *name, *bytes))
            .collect();
        self.post_multipart("/upload", &parts).await
    }

    /// Process staged uploads with a tolerance
    pub async fn process(&self, filenames: &[&str], tolerance: i32) -> TestResponse {
        let files: Vec<serde_json::Value> = filenames
            .iter()
            .map(|f| serde_json::json!({ "filename": f }))
            .collect();
        let body = serde_json::json!({ "files": files, "tolerance": tolerance });
        self.post_json("/process", &body.to_string()).await
    }

    /// Send a request to the router
    async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes()
            .to_vec();

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Test response with convenience methods
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Parse body as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to parse JSON response")
    }

    /// Get body as string
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    /// Get raw body bytes
    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    /// Header value as string
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Check if response is a PNG image
    pub fn is_png(&self) -> bool {
        self.body.len() >= 8 && &self.body[0..8] == b"\x89PNG\r\n\x1a\n"
    }
}
