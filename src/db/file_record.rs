//! Uploaded file metadata records.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::DbPool;
use crate::{FileShareError, Result};

/// Metadata for one uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    /// Row ID.
    pub id: i64,
    /// Generated name the file is stored under (`<uuid><ext>`).
    pub storage_name: String,
    /// Client-supplied filename.
    pub original_name: String,
    /// Download URL built at upload time.
    pub url: String,
    /// When the record was created.
    pub upload_timestamp: DateTime<Utc>,
}

/// Data for creating a new record.
#[derive(Debug, Clone)]
pub struct NewFileRecord {
    /// Client-supplied filename.
    pub original_name: String,
    /// Generated storage name.
    pub storage_name: String,
    /// Download URL.
    pub url: String,
}

impl NewFileRecord {
    /// Create a new NewFileRecord.
    pub fn new(
        original_name: impl Into<String>,
        storage_name: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            original_name: original_name.into(),
            storage_name: storage_name.into(),
            url: url.into(),
        }
    }
}

#[derive(sqlx::FromRow)]
struct FileRecordRow {
    id: i64,
    storage_name: String,
    original_name: String,
    url: String,
    upload_timestamp: String,
}

impl TryFrom<FileRecordRow> for FileRecord {
    type Error = FileShareError;

    fn try_from(row: FileRecordRow) -> Result<Self> {
        let upload_timestamp = DateTime::parse_from_rfc3339(&row.upload_timestamp)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                FileShareError::Database(format!(
                    "invalid upload_timestamp {:?}: {e}",
                    row.upload_timestamp
                ))
            })?;

        Ok(FileRecord {
            id: row.id,
            storage_name: row.storage_name,
            original_name: row.original_name,
            url: row.url,
            upload_timestamp,
        })
    }
}

/// Fixed-width so that text ordering in SQL matches time ordering.
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Repository for file record operations.
pub struct FileRecordRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> FileRecordRepository<'a> {
    /// Create a new repository instance.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Insert a record stamped with the current time.
    pub async fn insert(&self, record: &NewFileRecord) -> Result<FileRecord> {
        self.insert_at(record, Utc::now()).await
    }

    /// Insert a record with an explicit upload time.
    pub async fn insert_at(
        &self,
        record: &NewFileRecord,
        uploaded_at: DateTime<Utc>,
    ) -> Result<FileRecord> {
        let uploaded_at = uploaded_at.trunc_subsecs(6);

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO file_records (storage_name, original_name, url, upload_timestamp)
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&record.storage_name)
        .bind(&record.original_name)
        .bind(&record.url)
        .bind(format_timestamp(&uploaded_at))
        .fetch_one(self.pool)
        .await?;

        Ok(FileRecord {
            id,
            storage_name: record.storage_name.clone(),
            original_name: record.original_name.clone(),
            url: record.url.clone(),
            upload_timestamp: uploaded_at,
        })
    }

    /// List all records (ordered by upload_timestamp descending).
    pub async fn list_all(&self) -> Result<Vec<FileRecord>> {
        let rows = sqlx::query_as::<_, FileRecordRow>(
            "SELECT id, storage_name, original_name, url, upload_timestamp
             FROM file_records ORDER BY upload_timestamp DESC, id DESC",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(FileRecord::try_from).collect()
    }

    /// Count all records.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM file_records")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
