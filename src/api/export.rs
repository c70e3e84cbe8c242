use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json as JsonExtractor,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::services::{export_zip_bytes, FileOrchestrator, EXPORT_FILE_NAME};

/// Request body for /download_all
#[derive(Debug, Deserialize, ToSchema)]
pub struct ExportRequest {
    /// Processed file names to bundle
    #[serde(default)]
    pub files: Vec<String>,
}

/// Download several processed images as one zip
///
/// Names that do not exist in the processed directory are left out of the
/// archive without failing the request.
#[utoipa::path(
    post,
    path = "/download_all",
    request_body = ExportRequest,
    responses(
        (status = 200, description = "Zip archive", content_type = "application/zip"),
        (status = 400, description = "Malformed JSON body or wrong field types"),
    ),
    tag = "Files"
)]
pub async fn handle_download_all(
    State(orchestrator): State<Arc<FileOrchestrator>>,
    request: Result<JsonExtractor<ExportRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let JsonExtractor(request) = request?;
    let processed_dir = orchestrator.processed_dir().to_path_buf();
    let names = request.files;

    let (report, zip_bytes) =
        tokio::task::spawn_blocking(move || export_zip_bytes(&processed_dir, &names))
            .await
            .map_err(|e| ApiError::Internal(format!("Task error: {e}")))??;

    if !report.skipped.is_empty() {
        tracing::info!(skipped = ?report.skipped, "Batch export skipped missing files");
    }

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_LENGTH, zip_bytes.len().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
            ),
        ],
        Bytes::from(zip_bytes),
    )
        .into_response())
}
