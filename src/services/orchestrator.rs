use crate::error::ProcessError;
use crate::models::{processed_file_name, StoredFile};
use crate::rendering::{decode_rgba, encode_png, PngOptions};
use near_white::{strip_in_place, Tolerance};
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Archives originals, strips near-white pixels and writes the PNG result.
///
/// Owns the archive and processed directories. All methods are synchronous;
/// call them from `spawn_blocking` inside async handlers.
pub struct FileOrchestrator {
    archive_dir: PathBuf,
    processed_dir: PathBuf,
    png: PngOptions,
}

impl FileOrchestrator {
    pub fn new(
        archive_dir: impl Into<PathBuf>,
        processed_dir: impl Into<PathBuf>,
        png: PngOptions,
    ) -> Self {
        Self {
            archive_dir: archive_dir.into(),
            processed_dir: processed_dir.into(),
            png,
        }
    }

    pub fn archive_dir(&self) -> &Path {
        &self.archive_dir
    }

    pub fn processed_dir(&self) -> &Path {
        &self.processed_dir
    }

    /// Create the archive and processed directories if missing
    pub fn ensure_dirs(&self) -> io::Result<()> {
        fs::create_dir_all(&self.archive_dir)?;
        fs::create_dir_all(&self.processed_dir)?;
        Ok(())
    }

    /// Where the processed output for `input` is written
    pub fn processed_path_for(&self, input: &Path) -> PathBuf {
        self.processed_dir.join(processed_file_name(input))
    }

    /// Where the archived original for `input` lives
    pub fn archive_path_for(&self, input: &Path) -> Option<PathBuf> {
        input.file_name().map(|name| self.archive_dir.join(name))
    }

    /// Process one input file.
    ///
    /// When `archive_original` is set, the input is copied byte-for-byte to
    /// the archive directory unless a file with the same basename is already
    /// there. The stripped image is always written to
    /// `processed_dir/<stem>.png`, replacing any previous result. An archive
    /// written before a later failure is left in place.
    pub fn process(
        &self,
        input: &Path,
        tolerance: Tolerance,
        archive_original: bool,
    ) -> Result<StoredFile, ProcessError> {
        self.ensure_dirs()?;

        if !input.is_file() {
            return Err(ProcessError::NotFound(input.to_path_buf()));
        }

        let (archived, archived_now) = if archive_original {
            let dest = self
                .archive_path_for(input)
                .ok_or_else(|| ProcessError::NotFound(input.to_path_buf()))?;
            let written = archive_once(input, &dest)?;
            if written {
                tracing::info!(
                    source = %input.display(),
                    archive = %dest.display(),
                    "Archived original"
                );
            } else {
                tracing::debug!(archive = %dest.display(), "Archive already present, keeping it");
            }
            (Some(dest), written)
        } else {
            (None, false)
        };

        let bytes = fs::read(input)?;
        let mut image = decode_rgba(&bytes).map_err(|source| ProcessError::Decode {
            path: input.to_path_buf(),
            source,
        })?;

        let cleared = strip_in_place(&mut image, tolerance);
        let png_bytes = encode_png(&image, self.png)?;

        let processed = self.processed_path_for(input);
        replace_file(&processed, &png_bytes)?;

        tracing::info!(
            input = %input.display(),
            output = %processed.display(),
            tolerance = tolerance.value(),
            width = image.width(),
            height = image.height(),
            cleared,
            size_bytes = png_bytes.len(),
            "Stripped near-white background"
        );

        Ok(StoredFile {
            original: input.to_path_buf(),
            archived,
            archived_now,
            processed,
        })
    }
}

/// Copy `src` to `dest` unless `dest` exists. Returns whether a copy was made.
///
/// Uses exclusive create, so concurrent callers cannot both write. A copy
/// that fails halfway removes its partial file.
fn archive_once(src: &Path, dest: &Path) -> io::Result<bool> {
    let mut out = match OpenOptions::new().write(true).create_new(true).open(dest) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(e),
    };

    let copied = File::open(src).and_then(|mut input| io::copy(&mut input, &mut out));
    if let Err(e) = copied {
        drop(out);
        let _ = fs::remove_file(dest);
        return Err(e);
    }
    Ok(true)
}

/// Write `bytes` beside `dest` and rename over it.
///
/// Readers and concurrent writers only ever see a complete file; with
/// several writers the last rename wins.
fn replace_file(dest: &Path, bytes: &[u8]) -> io::Result<()> {
    static NEXT: AtomicU64 = AtomicU64::new(0);

    let mut staging = dest.as_os_str().to_owned();
    staging.push(format!(
        ".{}.{}.tmp",
        std::process::id(),
        NEXT.fetch_add(1, Ordering::Relaxed)
    ));
    let staging = PathBuf::from(staging);

    if let Err(e) = fs::write(&staging, bytes).and_then(|_| fs::rename(&staging, dest)) {
        let _ = fs::remove_file(&staging);
        return Err(e);
    }
    Ok(())
}
