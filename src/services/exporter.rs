use crate::error::ExportError;
use crate::models::is_plain_basename;
use std::fs::File;
use std::io::{self, Cursor, Seek, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Download name offered for batch exports
pub const EXPORT_FILE_NAME: &str = "images_without_background.zip";

/// Outcome of a batch export
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub written: Vec<String>,
    pub skipped: Vec<String>,
}

/// Write a zip of the named files from `processed_dir` into `writer`.
///
/// Each entry is stored under its basename. Names that are missing, not
/// regular files, or not plain basenames are skipped and reported rather
/// than treated as errors. Duplicate names are written once.
pub fn export_zip<W: Write + Seek>(
    processed_dir: &Path,
    names: &[String],
    writer: W,
) -> Result<(ExportReport, W), ExportError> {
    let mut zip = ZipWriter::new(writer);
    // PNG data is already deflated
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let mut report = ExportReport::default();

    for name in names {
        if report.written.contains(name) {
            continue;
        }
        if !is_plain_basename(name) {
            tracing::debug!(name = %name, "Skipping export entry with path components");
            report.skipped.push(name.clone());
            continue;
        }

        let path = processed_dir.join(name);
        if path.exists() && !path.is_file() {
            report.skipped.push(name.clone());
            continue;
        }
        let mut file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(name = %name, "Skipping missing export entry");
                report.skipped.push(name.clone());
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        zip.start_file(name.as_str(), options)?;
        io::copy(&mut file, &mut zip)?;
        report.written.push(name.clone());
    }

    let writer = zip.finish()?;

    tracing::info!(
        written = report.written.len(),
        skipped = report.skipped.len(),
        "Batch export finished"
    );

    Ok((report, writer))
}

/// Build a batch export in memory
pub fn export_zip_bytes(
    processed_dir: &Path,
    names: &[String],
) -> Result<(ExportReport, Vec<u8>), ExportError> {
    let (report, cursor) = export_zip(processed_dir, names, Cursor::new(Vec::new()))?;
    Ok((report, cursor.into_inner()))
}
