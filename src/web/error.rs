//! API error handling for fileshare.
//!
//! Errors are rendered as `text/plain` bodies. Server-side failures never
//! expose their cause to the client; the detail goes to the log.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::FileShareError;

/// Body for an upload request without a file part.
pub const NO_FILE_UPLOADED: &str = "No file uploaded.";

/// Body for a download of an unknown storage name.
pub const FILE_NOT_FOUND: &str = "File not found.";

/// Body for every server-side failure.
pub const INTERNAL_ERROR: &str = "Internal Server Error";

/// API error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Bad request (400).
    BadRequest,
    /// Not found (404).
    NotFound,
    /// Internal server error (500).
    InternalError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    code: ErrorCode,
    message: String,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Create a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    /// Create a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Create an internal server error with the generic body.
    pub fn internal() -> Self {
        Self::new(ErrorCode::InternalError, INTERNAL_ERROR)
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Get the message sent to the client.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status_code(), self.message).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<FileShareError> for ApiError {
    fn from(err: FileShareError) -> Self {
        match err {
            FileShareError::NotFound(_) => ApiError::not_found(FILE_NOT_FOUND),
            FileShareError::Validation(msg) => ApiError::bad_request(msg),
            other => {
                tracing::error!(error = %other, "Request failed");
                ApiError::internal()
            }
        }
    }
}
