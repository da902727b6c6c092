//! File handling for fileshare.
//!
//! - Upload directory management and UUID-based storage names
//! - Upload, download and listing on top of the metadata store

mod service;
mod storage;

pub use service::{download_url, Download, FileShareService, UploadedFile, DOWNLOAD_PATH};
pub use storage::{extension_of, generate_storage_name, FileStorage};
