use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Application configuration loaded from a YAML file
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Staging directory for uploaded files
    pub upload_dir: PathBuf,

    /// First-seen copies of every processed input
    pub archive_dir: PathBuf,

    /// Stripped PNG output
    pub processed_dir: PathBuf,

    /// Tolerance used when a request does not specify one
    pub default_tolerance: i32,

    /// Maximum request body size in bytes
    pub max_upload_bytes: usize,

    /// Accepted upload extensions (lowercase, without dot)
    pub allowed_extensions: Vec<String>,

    /// Recompress processed PNGs with oxipng
    pub optimize_png: bool,
}

impl AppConfig {
    /// Load configuration from an optional YAML file.
    ///
    /// Missing keys take their defaults. An unreadable or invalid file is
    /// logged and the full default configuration is used instead.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            tracing::debug!("No config file configured, using defaults");
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_yaml(&content) {
                Ok(config) => {
                    tracing::info!(
                        path = %path.display(),
                        upload_dir = %config.upload_dir.display(),
                        archive_dir = %config.archive_dir.display(),
                        processed_dir = %config.processed_dir.display(),
                        "Loaded configuration"
                    );
                    config
                }
                Err(e) => {
                    tracing::warn!(%e, path = %path.display(), "Failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(%e, path = %path.display(), "Failed to read config, using defaults");
                Self::default()
            }
        }
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document deserializes to unit, not a mapping
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Create all working directories (idempotent)
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        for dir in [&self.upload_dir, &self.archive_dir, &self.processed_dir] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// Point all three directories below `root` (used by tests and the CLI)
    pub fn rooted_at(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            upload_dir: root.join("uploads"),
            archive_dir: root.join("originals"),
            processed_dir: root.join("processed"),
            ..Self::default()
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            archive_dir: PathBuf::from("originals"),
            processed_dir: PathBuf::from("processed"),
            default_tolerance: 10,
            max_upload_bytes: 50 * 1024 * 1024,
            allowed_extensions: ["png", "jpg", "jpeg", "gif", "bmp"]
                .into_iter()
                .map(String::from)
                .collect(),
            optimize_png: false,
        }
    }
}
