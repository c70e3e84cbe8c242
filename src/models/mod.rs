pub mod config;
pub mod stored_file;

pub use config::AppConfig;
pub use stored_file::{
    is_allowed_extension, is_plain_basename, processed_file_name, sanitize_filename, StoredFile,
};
