use crate::models::{is_allowed_extension, sanitize_filename};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use utoipa::ToSchema;

/// A file saved in the upload staging area
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct StoredUpload {
    /// Sanitized file name
    pub filename: String,
    /// Path of the staged file on the server
    #[schema(value_type = String)]
    pub path: PathBuf,
}

/// Staging directory for uploaded files.
///
/// Filenames are sanitized and checked against the extension allow-list
/// before anything touches the disk.
pub struct UploadStore {
    dir: PathBuf,
    allowed_extensions: Vec<String>,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>, allowed_extensions: Vec<String>) -> Self {
        Self {
            dir: dir.into(),
            allowed_extensions,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Sanitized name if `filename` would be accepted, `None` otherwise
    pub fn accept(&self, filename: &str) -> Option<String> {
        sanitize_filename(filename)
            .filter(|name| is_allowed_extension(name, &self.allowed_extensions))
    }

    /// Save an upload, replacing any staged file with the same name.
    ///
    /// Returns `Ok(None)` when the name is rejected.
    pub async fn save(&self, filename: &str, bytes: &[u8]) -> io::Result<Option<StoredUpload>> {
        let Some(name) = self.accept(filename) else {
            tracing::info!(filename = %filename, "Rejected upload with disallowed name");
            return Ok(None);
        };

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(&name);
        tokio::fs::write(&path, bytes).await?;

        tracing::info!(
            filename = %name,
            size_bytes = bytes.len(),
            "Stored upload"
        );

        Ok(Some(StoredUpload {
            filename: name,
            path,
        }))
    }

    /// Path of an existing staged upload for a client-supplied name
    pub fn resolve(&self, filename: &str) -> Option<PathBuf> {
        let name = sanitize_filename(filename)?;
        let path = self.dir.join(name);
        path.is_file().then_some(path)
    }
}
