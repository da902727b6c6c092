//! OpenAPI document for the file API.

use axum::{routing::get, Json, Router};
use utoipa::OpenApi;

use crate::db::FileRecord;
use crate::web::dto::{UploadForm, UploadResponse};

/// Path of the generated OpenAPI document.
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

#[derive(OpenApi)]
#[openapi(
    info(title = "fileshare", description = "Upload, download and list shared files"),
    paths(
        crate::web::handlers::file::upload_file,
        crate::web::handlers::file::download_file,
        crate::web::handlers::file::list_files,
    ),
    components(schemas(FileRecord, UploadForm, UploadResponse)),
    tags((name = "files", description = "File sharing"))
)]
pub struct ApiDoc;

/// Create a router serving the OpenAPI document.
pub fn create_docs_router() -> Router {
    Router::new().route(OPENAPI_PATH, get(|| async { Json(ApiDoc::openapi()) }))
}
