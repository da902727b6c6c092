//! Request DTOs.

use utoipa::ToSchema;

/// Multipart form accepted by `POST /upload`.
///
/// Only documents the wire format; the handler reads the parts directly.
#[derive(Debug, ToSchema)]
pub struct UploadForm {
    /// The file to share.
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}
