//! Database schema and migrations for fileshare.
//!
//! Migrations are applied in order when the database is opened. The
//! `schema_version` table records which ones have run.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: uploaded file metadata
    r#"
CREATE TABLE file_records (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    storage_name      TEXT NOT NULL UNIQUE,   -- <uuid><ext>, name on disk
    original_name     TEXT NOT NULL,          -- client supplied, display only
    url               TEXT NOT NULL,
    upload_timestamp  TEXT NOT NULL           -- RFC 3339 UTC, microseconds
);

CREATE INDEX idx_file_records_upload_timestamp ON file_records(upload_timestamp);
"#,
];
