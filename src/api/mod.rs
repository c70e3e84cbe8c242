pub mod export;
pub mod files;
pub mod process;
pub mod upload;

pub use export::{handle_download_all, ExportRequest, __path_handle_download_all};
pub use files::{
    handle_download, handle_original_file, handle_processed_file, handle_upload_file,
    __path_handle_download, __path_handle_original_file, __path_handle_processed_file,
    __path_handle_upload_file,
};
pub use process::{
    handle_process, ProcessItem, ProcessRequest, ProcessResponse, ProcessResult,
    __path_handle_process,
};
pub use upload::{handle_upload, UploadForm, UploadResponse, __path_handle_upload};
