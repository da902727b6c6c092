//! Response DTOs.

use serde::Serialize;
use utoipa::ToSchema;

/// Response to a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct UploadResponse {
    /// Absolute URL the file can be downloaded from.
    #[serde(rename = "fileUrl")]
    #[schema(example = "http://localhost:3000/download/0b1e7c1a-5a4e-4a55-9d7e-3f2d1c0b9a88.pdf")]
    pub file_url: String,
}

impl UploadResponse {
    /// Create a new UploadResponse.
    pub fn new(file_url: impl Into<String>) -> Self {
        Self {
            file_url: file_url.into(),
        }
    }
}
