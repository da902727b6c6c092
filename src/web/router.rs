//! Router configuration for the Web API.

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, services::ServeDir, trace::TraceLayer};

use super::handlers::{download_file, download_missing_name, list_files, upload_file, AppState};
use super::middleware::create_cors_layer;
use super::openapi::create_docs_router;

/// Create the file API router.
pub fn create_router(app_state: Arc<AppState>, cors_origins: &[String]) -> Router {
    Router::new()
        .route(
            "/upload",
            post(upload_file).layer(DefaultBodyLimit::disable()),
        )
        .route("/download/", get(download_missing_name))
        .route("/download/*filename", get(download_file))
        .route("/files", get(list_files))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins)),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

/// Create the complete application.
///
/// Requests matching no route are served from `public_dir`.
pub fn create_app(
    app_state: Arc<AppState>,
    cors_origins: &[String],
    public_dir: impl AsRef<Path>,
) -> Router {
    create_router(app_state, cors_origins)
        .merge(create_health_router())
        .merge(create_docs_router())
        .fallback_service(ServeDir::new(public_dir))
        .layer(CompressionLayer::new())
}
