//! On-disk file storage for fileshare.
//!
//! Files live flat in a single upload directory:
//! ```text
//! {upload_dir}/
//! ├── 0b1e7c1a-5a4e-4a55-9d7e-3f2d1c0b9a88.pdf
//! ├── 4f7d2e90-1c3b-4e5a-8b6f-9a0c1d2e3f40.txt
//! └── ...
//! ```
//! The directory is created on demand by the first write.

use std::io;
use std::path::{Component, Path, PathBuf};

use tokio::fs;
use uuid::Uuid;

use crate::{FileShareError, Result};

/// Extract the extension of a client-supplied filename, including the dot.
///
/// Only the final path component is considered. A leading dot marks a
/// hidden file, not an extension, and `..` has none.
///
/// ```
/// use fileshare::file::extension_of;
///
/// assert_eq!(extension_of("report.pdf"), ".pdf");
/// assert_eq!(extension_of("archive.tar.gz"), ".gz");
/// assert_eq!(extension_of(".bashrc"), "");
/// assert_eq!(extension_of("Makefile"), "");
/// ```
pub fn extension_of(filename: &str) -> &str {
    let trimmed = filename.trim_end_matches(['/', '\\']);
    let base = trimmed
        .rfind(['/', '\\'])
        .map_or(trimmed, |idx| &trimmed[idx + 1..]);

    match base.rfind('.') {
        Some(0) | None => "",
        Some(_) if base == ".." => "",
        Some(idx) => &base[idx..],
    }
}

/// Generate a storage name: a random UUID followed by the original extension.
pub fn generate_storage_name(original_name: &str) -> String {
    format!("{}{}", Uuid::new_v4(), extension_of(original_name))
}

/// Check that a name is a single plain path component.
fn is_plain_file_name(name: &str) -> bool {
    if name.is_empty() || name.contains(['/', '\\', '\0']) {
        return false;
    }

    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// File storage rooted at the upload directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    upload_dir: PathBuf,
}

impl FileStorage {
    /// Create a storage handle. Nothing is touched on disk until the first write.
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
        }
    }

    /// Get the upload directory.
    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Create the upload directory if it does not exist.
    ///
    /// Only the last path level is created. Losing a creation race to
    /// another request is not an error.
    pub async fn ensure_dir(&self) -> Result<()> {
        if fs::try_exists(&self.upload_dir).await.unwrap_or(false) {
            return Ok(());
        }

        match fs::create_dir(&self.upload_dir).await {
            Ok(()) => {
                tracing::info!(path = %self.upload_dir.display(), "Created upload directory");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(FileShareError::Storage(format!(
                "failed to create upload directory {}: {e}",
                self.upload_dir.display()
            ))),
        }
    }

    /// Store content under a freshly generated name and return that name.
    pub async fn save(&self, content: &[u8], original_name: &str) -> Result<String> {
        self.ensure_dir().await?;

        let storage_name = generate_storage_name(original_name);
        let path = self.upload_dir.join(&storage_name);

        fs::write(&path, content).await.map_err(|e| {
            FileShareError::Storage(format!("failed to write {}: {e}", path.display()))
        })?;

        tracing::debug!(
            storage_name = %storage_name,
            size = content.len(),
            "Stored uploaded file"
        );
        Ok(storage_name)
    }

    /// Resolve a storage name to its path.
    ///
    /// Returns `None` for anything that is not a single plain file name, so a
    /// request can never reach outside the upload directory.
    pub fn file_path(&self, storage_name: &str) -> Option<PathBuf> {
        is_plain_file_name(storage_name).then(|| self.upload_dir.join(storage_name))
    }

    /// Open a stored file for reading, returning the handle and its size.
    pub async fn open(&self, storage_name: &str) -> Result<(fs::File, u64)> {
        let not_found = || FileShareError::NotFound(format!("file {storage_name:?}"));
        let path = self.file_path(storage_name).ok_or_else(not_found)?;

        let file = match fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(not_found()),
            Err(e) => return Err(e.into()),
        };

        let metadata = file.metadata().await?;
        if !metadata.is_file() {
            return Err(not_found());
        }

        Ok((file, metadata.len()))
    }

    /// Check if a stored file exists.
    pub async fn exists(&self, storage_name: &str) -> bool {
        match self.file_path(storage_name) {
            Some(path) => fs::metadata(path)
                .await
                .map(|m| m.is_file())
                .unwrap_or(false),
            None => false,
        }
    }
}
