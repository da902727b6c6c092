//! File sharing service.
//!
//! Ties the on-disk storage to the metadata store:
//! - Upload: write the bytes, then record the metadata
//! - Download: open a stored file by its storage name
//! - Listing: all records, newest first

use std::sync::Arc;

use tokio::fs::File;

use crate::db::{FileRecord, MetadataStore, NewFileRecord};
use crate::Result;

use super::storage::FileStorage;

/// Path prefix under which stored files are served.
pub const DOWNLOAD_PATH: &str = "/download/";

/// A file received from a client.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Filename as sent by the client.
    pub original_name: String,
    /// File content.
    pub content: Vec<u8>,
}

impl UploadedFile {
    /// Create a new UploadedFile.
    pub fn new(original_name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            original_name: original_name.into(),
            content: content.into(),
        }
    }
}

/// An opened stored file ready to be streamed.
#[derive(Debug)]
pub struct Download {
    /// Storage name of the file.
    pub storage_name: String,
    /// Open file handle.
    pub file: File,
    /// File size in bytes.
    pub size: u64,
}

/// Build the public download URL for a stored file.
///
/// `base_url` is `<scheme>://<host>` without a trailing slash. The storage
/// name is percent-encoded because the extension is client controlled.
pub fn download_url(base_url: &str, storage_name: &str) -> String {
    format!(
        "{}{}{}",
        base_url.trim_end_matches('/'),
        DOWNLOAD_PATH,
        urlencoding::encode(storage_name)
    )
}

/// File sharing service.
#[derive(Clone)]
pub struct FileShareService {
    storage: FileStorage,
    store: Arc<dyn MetadataStore>,
}

impl FileShareService {
    /// Create a new FileShareService.
    pub fn new(storage: FileStorage, store: Arc<dyn MetadataStore>) -> Self {
        Self { storage, store }
    }

    /// Get the underlying storage.
    pub fn storage(&self) -> &FileStorage {
        &self.storage
    }

    /// Store an uploaded file and record its metadata.
    ///
    /// The file is written before the record is inserted. If the insert
    /// fails the file stays on disk without a record.
    pub async fn upload(&self, upload: &UploadedFile, base_url: &str) -> Result<FileRecord> {
        let storage_name = self
            .storage
            .save(&upload.content, &upload.original_name)
            .await?;

        let url = download_url(base_url, &storage_name);
        let new_record = NewFileRecord::new(&upload.original_name, &storage_name, url);

        match self.store.insert(&new_record).await {
            Ok(record) => {
                tracing::info!(
                    storage_name = %record.storage_name,
                    original_name = %record.original_name,
                    size = upload.content.len(),
                    "File uploaded"
                );
                Ok(record)
            }
            Err(e) => {
                tracing::warn!(
                    storage_name = %storage_name,
                    error = %e,
                    "Metadata insert failed; stored file is orphaned"
                );
                Err(e)
            }
        }
    }

    /// Open a stored file by storage name.
    ///
    /// The metadata store is not consulted.
    pub async fn open_download(&self, storage_name: &str) -> Result<Download> {
        let (file, size) = self.storage.open(storage_name).await?;
        Ok(Download {
            storage_name: storage_name.to_string(),
            file,
            size,
        })
    }

    /// List all file records, most recent first.
    pub async fn list(&self) -> Result<Vec<FileRecord>> {
        self.store.list_all().await
    }
}

impl std::fmt::Debug for FileShareService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileShareService")
            .field("storage", &self.storage)
            .finish_non_exhaustive()
    }
}
