pub mod exporter;
pub mod orchestrator;
pub mod upload_store;

pub use exporter::{export_zip, export_zip_bytes, ExportReport, EXPORT_FILE_NAME};
pub use orchestrator::FileOrchestrator;
pub use upload_store::{StoredUpload, UploadStore};
