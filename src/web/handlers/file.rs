//! File handlers: upload, download and listing.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{
        multipart::{Multipart, MultipartRejection},
        rejection::PathRejection,
        Path, State,
    },
    http::{header, HeaderMap, Uri},
    response::Response,
    Json,
};
use tokio_util::io::ReaderStream;

use super::AppState;
use crate::db::FileRecord;
use crate::file::UploadedFile;
use crate::web::dto::{UploadForm, UploadResponse};
use crate::web::error::{ApiError, FILE_NOT_FOUND, NO_FILE_UPLOADED};
use crate::web::origin::base_url;

/// Name of the multipart field carrying the file.
pub const FILE_FIELD: &str = "file";

/// Build a Content-Disposition header value for an attachment.
///
/// Non-ASCII names get an RFC 5987 `filename*` parameter next to a
/// sanitized fallback.
fn content_disposition_header(filename: &str) -> String {
    let needs_escape = |c: char| c.is_control() || c == '"' || c == '\\';

    if filename.is_ascii() && !filename.chars().any(needs_escape) {
        return format!("attachment; filename=\"{}\"", filename);
    }

    let sanitized: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| if needs_escape(c) { '_' } else { c })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        sanitized,
        urlencoding::encode(filename)
    )
}

/// Read the single file part of an upload form.
///
/// Parts other than `file`, and `file` parts without a filename or with an
/// empty one (a form submitted with no file chosen), are ignored. A second file part is rejected.
async fn read_upload(multipart: &mut Multipart) -> Result<UploadedFile, ApiError> {
    let mut upload: Option<UploadedFile> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::warn!("Failed to read multipart field: {}", e);
        ApiError::bad_request("Invalid multipart data")
    })? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let Some(original_name) = field
            .file_name()
            .filter(|s| !s.is_empty())
            .map(str::to_string)
        else {
            continue;
        };
        if upload.is_some() {
            return Err(ApiError::bad_request("Unexpected field"));
        }

        let content = field.bytes().await.map_err(|e| {
            tracing::warn!("Failed to read file content: {}", e);
            ApiError::bad_request("Invalid multipart data")
        })?;
        upload = Some(UploadedFile::new(original_name, content.to_vec()));
    }

    upload.ok_or_else(|| ApiError::bad_request(NO_FILE_UPLOADED))
}

/// POST /upload - Upload a file.
///
/// Request body: multipart/form-data with a "file" field.
#[utoipa::path(
    post,
    path = "/upload",
    tag = "files",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File uploaded", body = UploadResponse),
        (status = 400, description = "No file uploaded."),
        (status = 500, description = "Internal Server Error")
    )
)]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    uri: Uri,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart = multipart.map_err(|e| {
        tracing::debug!("Upload without multipart body: {}", e);
        ApiError::bad_request(NO_FILE_UPLOADED)
    })?;

    let upload = read_upload(&mut multipart).await?;
    let base = base_url(&headers, &uri, state.trust_proxy);
    let record = state.service.upload(&upload, &base).await?;

    Ok(Json(UploadResponse::new(record.url)))
}

/// GET /download/*filename - Download a stored file.
///
/// Anything that is not a stored file name is answered with 404.
#[utoipa::path(
    get,
    path = "/download/{filename}",
    tag = "files",
    params(
        ("filename" = String, Path, description = "Storage name returned by the upload")
    ),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 404, description = "File not found.")
    )
)]
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    filename: Result<Path<String>, PathRejection>,
) -> Result<Response, ApiError> {
    // Generated names are always valid UTF-8.
    let Path(filename) = filename.map_err(|e| {
        tracing::debug!("Unusable download path: {}", e);
        ApiError::not_found(FILE_NOT_FOUND)
    })?;
    let download = state.service.open_download(&filename).await?;

    let mime = mime_guess::from_path(&download.storage_name).first_or_octet_stream();
    let body = Body::from_stream(ReaderStream::new(download.file));

    let response = Response::builder()
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(&download.storage_name),
        )
        .header(header::CONTENT_LENGTH, download.size)
        .body(body)
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal()
        })?;

    Ok(response)
}

/// GET /download/ - No file name given.
pub async fn download_missing_name() -> ApiError {
    ApiError::not_found(FILE_NOT_FOUND)
}

/// GET /files - List all uploaded files, most recent first.
#[utoipa::path(
    get,
    path = "/files",
    tag = "files",
    responses(
        (status = 200, description = "All file records, newest first", body = Vec<FileRecord>),
        (status = 500, description = "Internal Server Error")
    )
)]
pub async fn list_files(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<FileRecord>>, ApiError> {
    let records = state.service.list().await?;
    Ok(Json(records))
}
