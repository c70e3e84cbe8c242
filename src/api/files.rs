use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::path::Path as FsPath;
use std::sync::Arc;

use crate::error::ApiError;
use crate::models::{is_plain_basename, sanitize_filename};
use crate::services::{FileOrchestrator, UploadStore};

/// Content type for an image file name
pub fn content_type_for(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}

/// Read `dir/name` and return it as a response.
///
/// The name is sanitized the same way uploads are, so it can never leave
/// `dir`. Absent files map to 404.
pub async fn serve_file(
    dir: &FsPath,
    name: &str,
    attachment: bool,
) -> Result<Response, ApiError> {
    let name = sanitize_filename(name)
        .filter(|n| is_plain_basename(n))
        .ok_or(ApiError::NotFound)?;
    let path = dir.join(&name);

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(ApiError::NotFound),
        Err(e) if path.is_dir() => {
            tracing::debug!(path = %path.display(), error = %e, "Refusing to serve directory");
            return Err(ApiError::NotFound);
        }
        Err(e) => return Err(ApiError::Internal(format!("Failed to read file: {e}"))),
    };

    tracing::debug!(
        path = %path.display(),
        size_bytes = bytes.len(),
        attachment,
        "Serving file"
    );

    let mut response = (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type_for(&name).to_string()),
            (header::CONTENT_LENGTH, bytes.len().to_string()),
        ],
        Bytes::from(bytes),
    )
        .into_response();

    if attachment {
        let disposition = format!("attachment; filename=\"{name}\"");
        if let Ok(value) = header::HeaderValue::from_str(&disposition) {
            response
                .headers_mut()
                .insert(header::CONTENT_DISPOSITION, value);
        }
    }

    Ok(response)
}

/// Get a staged upload
#[utoipa::path(
    get,
    path = "/uploads/{name}",
    responses(
        (status = 200, description = "Original upload bytes"),
        (status = 404, description = "No such upload"),
    ),
    params(("name" = String, Path, description = "Upload file name")),
    tag = "Files"
)]
pub async fn handle_upload_file(
    State(uploads): State<Arc<UploadStore>>,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    serve_file(uploads.dir(), &name, false).await
}

/// Get a processed PNG
#[utoipa::path(
    get,
    path = "/processed/{name}",
    responses(
        (status = 200, description = "Processed PNG", content_type = "image/png"),
        (status = 404, description = "No such processed file"),
    ),
    params(("name" = String, Path, description = "Processed file name (always .png)")),
    tag = "Files"
)]
pub async fn handle_processed_file(
    State(orchestrator): State<Arc<FileOrchestrator>>,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    serve_file(orchestrator.processed_dir(), &name, false).await
}

/// Get an archived original
#[utoipa::path(
    get,
    path = "/originals/{name}",
    responses(
        (status = 200, description = "First-seen copy of the input"),
        (status = 404, description = "No archived original with that name"),
    ),
    params(("name" = String, Path, description = "Original file name")),
    tag = "Files"
)]
pub async fn handle_original_file(
    State(orchestrator): State<Arc<FileOrchestrator>>,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    serve_file(orchestrator.archive_dir(), &name, false).await
}

/// Download a processed PNG as an attachment
#[utoipa::path(
    get,
    path = "/download/{name}",
    responses(
        (status = 200, description = "Processed PNG with Content-Disposition: attachment", content_type = "image/png"),
        (status = 404, description = "No such processed file"),
    ),
    params(("name" = String, Path, description = "Processed file name")),
    tag = "Files"
)]
pub async fn handle_download(
    State(orchestrator): State<Arc<FileOrchestrator>>,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    serve_file(orchestrator.processed_dir(), &name, true).await
}
