use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use near_white::Tolerance;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::error::{ApiError, ProcessError};
use crate::models::AppConfig;
use crate::services::{FileOrchestrator, UploadStore};

/// A staged upload to process
#[derive(Debug, Deserialize, ToSchema)]
pub struct ProcessItem {
    /// Name returned by /upload
    pub filename: String,
}

/// Request body for /process
#[derive(Debug, Deserialize, ToSchema)]
pub struct ProcessRequest {
    /// Files to process, in order
    #[serde(default)]
    pub files: Vec<ProcessItem>,
    /// Tolerance below 255 still treated as white (server default if absent).
    /// Not range-checked: values <= 0 match nothing, values >= 256 match everything.
    #[serde(default, deserialize_with = "any_number")]
    pub tolerance: Option<i64>,
    /// Keep a first-seen copy of each input (default true)
    #[serde(default)]
    pub archive_original: Option<bool>,
}

/// Accept any JSON number, saturating into `i64`.
///
/// Integers past `u64` arrive as floats; fractions truncate toward zero.
fn any_number<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(number) = Option::<serde_json::Number>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let value = if let Some(v) = number.as_i64() {
        v
    } else if number.as_u64().is_some() {
        i64::MAX
    } else {
        // `as` saturates for floats
        number.as_f64().map_or(0, |f| f as i64)
    };
    Ok(Some(value))
}

/// Outcome for a single file
#[derive(Debug, Serialize, ToSchema)]
pub struct ProcessResult {
    /// Name as given in the request
    pub filename: String,
    pub success: bool,
    /// Processed PNG file name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed: Option<String>,
    /// URL of the staged original
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_original: Option<String>,
    /// URL of the processed PNG
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_processed: Option<String>,
    /// Failure reason
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProcessResult {
    fn failed(filename: String, error: impl Into<String>) -> Self {
        Self {
            filename,
            success: false,
            processed: None,
            url_original: None,
            url_processed: None,
            error: Some(error.into()),
        }
    }
}

/// Response from /process
#[derive(Debug, Serialize, ToSchema)]
pub struct ProcessResponse {
    pub results: Vec<ProcessResult>,
}

/// Strip near-white backgrounds from staged uploads
///
/// Files are processed one after another. A failing file is reported in its
/// own result entry and does not stop the remaining files.
#[utoipa::path(
    post,
    path = "/process",
    request_body = ProcessRequest,
    responses(
        (status = 200, description = "Per-file results", body = ProcessResponse),
        (status = 400, description = "Malformed JSON body or wrong field types"),
    ),
    tag = "Processing"
)]
pub async fn handle_process(
    State(config): State<Arc<AppConfig>>,
    State(uploads): State<Arc<UploadStore>>,
    State(orchestrator): State<Arc<FileOrchestrator>>,
    request: Result<Json<ProcessRequest>, JsonRejection>,
) -> Result<Json<ProcessResponse>, ApiError> {
    let Json(request) = request?;
    let tolerance = request
        .tolerance
        .map(Tolerance::saturating)
        .unwrap_or(Tolerance::new(config.default_tolerance));
    let archive_original = request.archive_original.unwrap_or(true);

    tracing::info!(
        files = request.files.len(),
        tolerance = tolerance.value(),
        archive_original,
        "Process request received"
    );

    let mut results = Vec::with_capacity(request.files.len());
    for item in request.files {
        let Some(path) = uploads.resolve(&item.filename) else {
            tracing::warn!(filename = %item.filename, "Requested upload not found");
            results.push(ProcessResult::failed(item.filename, "File not found"));
            continue;
        };

        let orch = orchestrator.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            orch.process(&path, tolerance, archive_original)
        })
        .await;

        let result = match outcome {
            Ok(Ok(stored)) => {
                let processed = stored.processed_name();
                let original = stored
                    .original
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                ProcessResult {
                    filename: item.filename,
                    success: true,
                    url_original: Some(format!("/uploads/{original}")),
                    url_processed: Some(format!("/processed/{processed}")),
                    processed: Some(processed),
                    error: None,
                }
            }
            Ok(Err(e)) => {
                log_failure(&item.filename, &e);
                ProcessResult::failed(item.filename, e.to_string())
            }
            Err(e) => {
                tracing::error!(filename = %item.filename, error = %e, "Processing task failed");
                ProcessResult::failed(item.filename, format!("Task error: {e}"))
            }
        };
        results.push(result);
    }

    let succeeded = results.iter().filter(|r| r.success).count();
    tracing::info!(
        succeeded,
        failed = results.len() - succeeded,
        "Process request finished"
    );

    Ok(Json(ProcessResponse { results }))
}

fn log_failure(filename: &str, error: &ProcessError) {
    match error {
        ProcessError::Decode { .. } => {
            tracing::warn!(filename = %filename, error = %error, "Upload is not a readable image")
        }
        _ => tracing::error!(filename = %filename, error = %error, "Processing failed"),
    }
}
