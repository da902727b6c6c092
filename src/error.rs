//! Error types for fileshare.

use thiserror::Error;

/// Common error type for fileshare.
#[derive(Error, Debug)]
pub enum FileShareError {
    /// Metadata store error.
    ///
    /// Wraps query and insert failures from the database backend.
    /// Errors from sqlx are automatically converted.
    #[error("database error: {0}")]
    Database(String),

    /// Metadata store connection error.
    #[error("database connection error: {0}")]
    DatabaseConnection(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Upload directory or file write failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Validation error for client input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

// Conversion from sqlx errors
impl From<sqlx::Error> for FileShareError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                FileShareError::DatabaseConnection(e.to_string())
            }
            _ => FileShareError::Database(e.to_string()),
        }
    }
}

/// Result type alias for fileshare operations.
pub type Result<T> = std::result::Result<T, FileShareError>;
