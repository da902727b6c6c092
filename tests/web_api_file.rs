//! Web API File Tests
//!
//! Integration tests for the upload, download and listing endpoints.

use std::path::PathBuf;
use std::sync::Arc;

use axum::async_trait;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use fileshare::db::{FileRecord, MetadataStore, NewFileRecord};
use fileshare::file::{FileShareService, FileStorage};
use fileshare::web::create_app;
use fileshare::web::handlers::AppState;
use fileshare::{Database, FileShareError};
use serde_json::Value;
use tempfile::TempDir;

struct TestContext {
    server: TestServer,
    db: Arc<Database>,
    upload_dir: PathBuf,
    _temp_dir: TempDir,
}

/// Create a test server with an in-memory database and a temporary upload directory.
async fn create_test_server() -> TestContext {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db = Arc::new(
        Database::open_in_memory()
            .await
            .expect("Failed to create test database"),
    );

    let upload_dir = temp_dir.path().join("uploads");
    let public_dir = temp_dir.path().join("public");
    std::fs::create_dir(&public_dir).unwrap();
    std::fs::write(public_dir.join("index.html"), "<h1>fileshare</h1>").unwrap();

    let service = FileShareService::new(FileStorage::new(&upload_dir), db.clone());
    let router = create_app(Arc::new(AppState::new(service)), &[], &public_dir);
    let server = TestServer::new(router).expect("Failed to create test server");

    TestContext {
        server,
        db,
        upload_dir,
        _temp_dir: temp_dir,
    }
}

fn file_form(name: &str, content: &[u8]) -> MultipartForm {
    MultipartForm::new().add_part("file", Part::bytes(content.to_vec()).file_name(name))
}

/// Upload a file and return the `fileUrl` from the response.
async fn upload(server: &TestServer, name: &str, content: &[u8]) -> String {
    let response = server.post("/upload").multipart(file_form(name, content)).await;
    response.assert_status_ok();

    let body: Value = response.json();
    body["fileUrl"].as_str().unwrap().to_string()
}

/// Path part of a download URL.
fn download_path(file_url: &str) -> String {
    let idx = file_url.find("/download/").unwrap();
    file_url[idx..].to_string()
}

fn uploaded_files(dir: &PathBuf) -> Vec<PathBuf> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries.flatten().map(|e| e.path()).collect(),
        Err(_) => Vec::new(),
    }
}

// ============================================================================
// Upload
// ============================================================================

#[tokio::test]
async fn test_upload_returns_file_url() {
    let ctx = create_test_server().await;

    let file_url = upload(&ctx.server, "report.pdf", b"%PDF-1.4 test").await;

    assert!(file_url.starts_with("http://"));
    assert!(file_url.contains("/download/"));
    assert!(file_url.ends_with(".pdf"));

    let files = uploaded_files(&ctx.upload_dir);
    assert_eq!(files.len(), 1);
    assert_eq!(std::fs::read(&files[0]).unwrap(), b"%PDF-1.4 test");
}

#[tokio::test]
async fn test_upload_uses_host_header() {
    let ctx = create_test_server().await;

    let response = ctx
        .server
        .post("/upload")
        .add_header(
            HeaderName::from_static("host"),
            HeaderValue::from_static("files.example.com:8080"),
        )
        .multipart(file_form("a.txt", b"hello"))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let file_url = body["fileUrl"].as_str().unwrap();
    assert!(file_url.starts_with("http://files.example.com:8080/download/"));
}

#[tokio::test]
async fn test_upload_without_file() {
    let ctx = create_test_server().await;

    let response = ctx
        .server
        .post("/upload")
        .multipart(MultipartForm::new().add_text("description", "no file here"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "No file uploaded.");
    assert!(!ctx.upload_dir.exists());
    assert!(ctx.db.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_without_multipart_body() {
    let ctx = create_test_server().await;

    let response = ctx.server.post("/upload").text("just text").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "No file uploaded.");
    assert!(!ctx.upload_dir.exists());
}

#[tokio::test]
async fn test_upload_file_field_without_filename() {
    let ctx = create_test_server().await;

    let response = ctx
        .server
        .post("/upload")
        .multipart(MultipartForm::new().add_text("file", "not a file"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "No file uploaded.");
}

#[tokio::test]
async fn test_upload_empty_filename_is_no_file() {
    let ctx = create_test_server().await;

    let response = ctx.server.post("/upload").multipart(file_form("", b"")).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.text(), "No file uploaded.");
    assert!(!ctx.upload_dir.exists());
    assert!(ctx.db.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_ignores_other_fields() {
    let ctx = create_test_server().await;

    let form = MultipartForm::new()
        .add_text("description", "quarterly numbers")
        .add_part("file", Part::bytes(b"1,2,3".to_vec()).file_name("data.csv"));
    let response = ctx.server.post("/upload").multipart(form).await;

    response.assert_status_ok();
    assert_eq!(uploaded_files(&ctx.upload_dir).len(), 1);
}

#[tokio::test]
async fn test_upload_two_file_parts_rejected() {
    let ctx = create_test_server().await;

    let form = MultipartForm::new()
        .add_part("file", Part::bytes(b"one".to_vec()).file_name("one.txt"))
        .add_part("file", Part::bytes(b"two".to_vec()).file_name("two.txt"));
    let response = ctx.server.post("/upload").multipart(form).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(uploaded_files(&ctx.upload_dir).is_empty());
    assert!(ctx.db.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_same_name_twice() {
    let ctx = create_test_server().await;

    let first = upload(&ctx.server, "same.txt", b"first").await;
    let second = upload(&ctx.server, "same.txt", b"second").await;

    assert_ne!(first, second);
    assert_eq!(uploaded_files(&ctx.upload_dir).len(), 2);

    let records = ctx.db.list_all().await.unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.original_name == "same.txt"));
}

#[tokio::test]
async fn test_upload_path_in_filename_stays_in_upload_dir() {
    let ctx = create_test_server().await;

    let file_url = upload(&ctx.server, "../../escape.txt", b"x").await;

    assert!(file_url.ends_with(".txt"));
    let files = uploaded_files(&ctx.upload_dir);
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].parent().unwrap(), ctx.upload_dir.as_path());
}

#[tokio::test]
async fn test_upload_empty_file() {
    let ctx = create_test_server().await;

    let file_url = upload(&ctx.server, "empty.txt", b"").await;

    let response = ctx.server.get(&download_path(&file_url)).await;
    response.assert_status_ok();
    assert!(response.as_bytes().is_empty());
}

// ============================================================================
// Download
// ============================================================================

#[tokio::test]
async fn test_upload_download_roundtrip() {
    let ctx = create_test_server().await;
    let content: Vec<u8> = (0..=255u8).cycle().take(70_000).collect();

    let file_url = upload(&ctx.server, "blob.bin", &content).await;
    let response = ctx.server.get(&download_path(&file_url)).await;

    response.assert_status_ok();
    assert_eq!(response.as_bytes().as_ref(), content.as_slice());

    let storage_name = file_url.rsplit('/').next().unwrap();
    let disposition = response.header("content-disposition");
    assert_eq!(
        disposition.to_str().unwrap(),
        format!("attachment; filename=\"{storage_name}\"")
    );
    assert_eq!(
        response.header("content-length").to_str().unwrap(),
        "70000"
    );
}

#[tokio::test]
async fn test_download_content_type_from_extension() {
    let ctx = create_test_server().await;

    let file_url = upload(&ctx.server, "notes.txt", b"hello").await;
    let response = ctx.server.get(&download_path(&file_url)).await;

    response.assert_status_ok();
    let content_type = response.header("content-type");
    assert!(content_type.to_str().unwrap().starts_with("text/plain"));
}

#[tokio::test]
async fn test_download_not_found() {
    let ctx = create_test_server().await;

    let response = ctx.server.get("/download/never-generated.txt").await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.text(), "File not found.");
}

#[tokio::test]
async fn test_download_traversal_not_found() {
    let ctx = create_test_server().await;
    std::fs::write(ctx._temp_dir.path().join("secret.txt"), b"top secret").unwrap();
    upload(&ctx.server, "a.txt", b"a").await;

    let response = ctx.server.get("/download/..%2Fsecret.txt").await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.text(), "File not found.");
}

#[tokio::test]
async fn test_download_invalid_utf8_name_not_found() {
    let ctx = create_test_server().await;

    let response = ctx.server.get("/download/%FF").await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.text(), "File not found.");
}

#[tokio::test]
async fn test_download_empty_or_nested_name_not_found() {
    let ctx = create_test_server().await;
    let file_url = upload(&ctx.server, "a.txt", b"a").await;
    let storage_name = file_url.rsplit('/').next().unwrap().to_string();

    for path in [
        "/download/".to_string(),
        "/download/a/b".to_string(),
        format!("/download/nested/{storage_name}"),
    ] {
        let response = ctx.server.get(&path).await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(response.text(), "File not found.", "{path}");
    }
}

#[tokio::test]
async fn test_download_ignores_metadata() {
    let ctx = create_test_server().await;
    std::fs::create_dir(&ctx.upload_dir).unwrap();
    std::fs::write(ctx.upload_dir.join("placed-by-hand.txt"), b"manual").unwrap();

    let response = ctx.server.get("/download/placed-by-hand.txt").await;

    response.assert_status_ok();
    assert_eq!(response.text(), "manual");
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_list_files_empty() {
    let ctx = create_test_server().await;

    let response = ctx.server.get("/files").await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), serde_json::json!([]));
}

#[tokio::test]
async fn test_list_files_newest_first() {
    let ctx = create_test_server().await;

    let mut urls = Vec::new();
    for name in ["first.txt", "second.png", "third.pdf"] {
        urls.push(upload(&ctx.server, name, name.as_bytes()).await);
    }

    let response = ctx.server.get("/files").await;
    response.assert_status_ok();

    let records: Vec<Value> = response.json();
    assert_eq!(records.len(), 3);

    let names: Vec<&str> = records
        .iter()
        .map(|r| r["originalName"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["third.pdf", "second.png", "first.txt"]);

    let listed_urls: Vec<&str> = records.iter().map(|r| r["url"].as_str().unwrap()).collect();
    assert_eq!(listed_urls, vec![&urls[2][..], &urls[1][..], &urls[0][..]]);

    for record in &records {
        assert!(record["id"].is_i64());
        assert!(record["storageName"].is_string());
        assert!(record["uploadTimestamp"].is_string());
    }
}

// ============================================================================
// Failure handling
// ============================================================================

struct UnavailableStore;

#[async_trait]
impl MetadataStore for UnavailableStore {
    async fn insert(&self, _record: &NewFileRecord) -> fileshare::Result<FileRecord> {
        Err(FileShareError::DatabaseConnection("store offline".into()))
    }

    async fn list_all(&self) -> fileshare::Result<Vec<FileRecord>> {
        Err(FileShareError::DatabaseConnection("store offline".into()))
    }
}

#[tokio::test]
async fn test_store_failure_returns_500_and_keeps_file() {
    let temp_dir = TempDir::new().unwrap();
    let upload_dir = temp_dir.path().join("uploads");
    let service = FileShareService::new(FileStorage::new(&upload_dir), Arc::new(UnavailableStore));
    let router = create_app(
        Arc::new(AppState::new(service)),
        &[],
        temp_dir.path().join("public"),
    );
    let server = TestServer::new(router).unwrap();

    let response = server
        .post("/upload")
        .multipart(file_form("a.txt", b"data"))
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.text(), "Internal Server Error");
    assert_eq!(uploaded_files(&upload_dir).len(), 1);

    let response = server.get("/files").await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!response.text().contains("store offline"));
}

// ============================================================================
// Static files and health
// ============================================================================

#[tokio::test]
async fn test_static_fallback() {
    let ctx = create_test_server().await;

    let response = ctx.server.get("/index.html").await;
    response.assert_status_ok();
    assert_eq!(response.text(), "<h1>fileshare</h1>");

    let response = ctx.server.get("/").await;
    response.assert_status_ok();
    assert_eq!(response.text(), "<h1>fileshare</h1>");
}

#[tokio::test]
async fn test_static_missing_file() {
    let ctx = create_test_server().await;

    let response = ctx.server.get("/missing.css").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health() {
    let ctx = create_test_server().await;

    let response = ctx.server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.text(), "OK");
}
