//! HTTP server setup and configuration.
//!
//! This module provides the router and application state used by both
//! the production server and integration tests.

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Multipart, Path, State},
    http::header::CACHE_CONTROL,
    response::{Json, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::api;
use crate::error::ApiError;
use crate::models::AppConfig;
use crate::rendering::PngOptions;
use crate::services::{FileOrchestrator, UploadStore};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub uploads: Arc<UploadStore>,
    pub orchestrator: Arc<FileOrchestrator>,
}

/// Create application state from configuration.
///
/// Creates the upload, archive and processed directories up front.
pub fn create_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    config
        .ensure_dirs()
        .map_err(|e| anyhow::anyhow!("Failed to create working directories: {e}"))?;

    let uploads = Arc::new(UploadStore::new(
        config.upload_dir.clone(),
        config.allowed_extensions.clone(),
    ));
    let orchestrator = Arc::new(FileOrchestrator::new(
        config.archive_dir.clone(),
        config.processed_dir.clone(),
        PngOptions {
            optimize: config.optimize_png,
        },
    ));

    Ok(AppState {
        config: Arc::new(config),
        uploads,
        orchestrator,
    })
}

/// Build the API router with all endpoints and middleware.
///
/// This is the core router used by both production and tests. File routes
/// send `Cache-Control: no-cache` because processed files are rewritten in
/// place whenever an image is reprocessed.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    let file_routes = Router::new()
        .route("/uploads/:name", get(handle_upload_file))
        .route("/processed/:name", get(handle_processed_file))
        .route("/originals/:name", get(handle_original_file))
        .route("/download/:name", get(handle_download))
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            axum::http::HeaderValue::from_static("no-cache"),
        ));

    Router::new()
        .route("/upload", post(handle_upload))
        .route("/process", post(handle_process))
        .route("/download_all", post(handle_download_all))
        .merge(file_routes)
        // Health check
        .route("/health", get(|| async { "OK" }))
        // Add state and tracing
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
}

// Wrapper handlers to extract state components for the underlying API handlers

async fn handle_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<api::UploadResponse>, ApiError> {
    api::handle_upload(State(state.uploads), multipart).await
}

async fn handle_process(
    State(state): State<AppState>,
    request: Result<Json<api::ProcessRequest>, JsonRejection>,
) -> Result<Json<api::ProcessResponse>, ApiError> {
    api::handle_process(
        State(state.config),
        State(state.uploads),
        State(state.orchestrator),
        request,
    )
    .await
}

async fn handle_download_all(
    State(state): State<AppState>,
    request: Result<Json<api::ExportRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    api::handle_download_all(State(state.orchestrator), request).await
}

async fn handle_upload_file(
    State(state): State<AppState>,
    path: Path<String>,
) -> Result<Response, ApiError> {
    api::handle_upload_file(State(state.uploads), path).await
}

async fn handle_processed_file(
    State(state): State<AppState>,
    path: Path<String>,
) -> Result<Response, ApiError> {
    api::handle_processed_file(State(state.orchestrator), path).await
}

async fn handle_original_file(
    State(state): State<AppState>,
    path: Path<String>,
) -> Result<Response, ApiError> {
    api::handle_original_file(State(state.orchestrator), path).await
}

async fn handle_download(
    State(state): State<AppState>,
    path: Path<String>,
) -> Result<Response, ApiError> {
    api::handle_download(State(state.orchestrator), path).await
}
