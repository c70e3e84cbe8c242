use axum::{
    extract::{Multipart, State},
    response::Json,
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::services::{StoredUpload, UploadStore};

/// Multipart form accepted by /upload (for API docs)
#[derive(Debug, ToSchema)]
#[allow(unused)]
pub struct UploadForm {
    /// One or more image files (png, jpg, jpeg, gif, bmp), repeated field
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub files: Vec<String>,
}

/// Response from /upload
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    /// Files that were accepted and staged
    pub files: Vec<StoredUpload>,
}

/// Upload images for processing
///
/// Files with a disallowed extension or an unusable name are skipped
/// silently; the response lists only the files that were stored.
#[utoipa::path(
    post,
    path = "/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Files staged", body = UploadResponse),
        (status = 400, description = "No `files` field in the form"),
        (status = 413, description = "Upload exceeds the size limit"),
    ),
    tag = "Upload"
)]
pub async fn handle_upload(
    State(uploads): State<Arc<UploadStore>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut saw_files_field = false;
    let mut stored = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("files") {
            continue;
        }
        saw_files_field = true;

        let filename = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => continue,
        };
        let bytes = field.bytes().await?;

        let saved = uploads
            .save(&filename, &bytes)
            .await
            .map_err(|e| ApiError::Internal(format!("Failed to store upload: {e}")))?;
        if let Some(upload) = saved {
            stored.push(upload);
        }
    }

    if !saw_files_field {
        return Err(ApiError::BadRequest("No files uploaded".to_string()));
    }

    tracing::info!(stored = stored.len(), "Upload request handled");

    Ok(Json(UploadResponse { files: stored }))
}
