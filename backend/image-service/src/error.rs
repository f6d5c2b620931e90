/// Error types for Image Service
///
/// Every failure the resolver can hit is folded into [`AppError`] before it
/// reaches the transport layer. The HTTP rendering is terse:
/// clients only ever see a status code and `ERROR: <status>`.
use crate::services::thumbnail::ProcessingError;
use crate::storage::StorageError;
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use thiserror::Error;

/// Result type for image-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Status used when an error carries none of its own
pub const DEFAULT_ERROR_STATUS: StatusCode = StatusCode::NOT_FOUND;

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// Source missing, unreadable path, or not an accepted image type
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request path or query could not be decoded
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Thumbnail could not be derived from the source
    #[error("Thumbnail generation failed for {key}: {source}")]
    Generation {
        key: String,
        #[source]
        source: ProcessingError,
    },

    /// Thumbnail was generated but could not be persisted
    #[error("Error creating file: {key}: {source}")]
    WriteFailure {
        key: String,
        #[source]
        source: StorageError,
    },

    /// Store failure outside the write path (read, metadata)
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl AppError {
    /// HTTP status carried by this error, if any.
    ///
    /// Generation and storage failures carry none and fall back to
    /// [`DEFAULT_ERROR_STATUS`] when rendered.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            AppError::NotFound(_) => Some(StatusCode::NOT_FOUND),
            AppError::BadRequest(_) => Some(StatusCode::BAD_REQUEST),
            AppError::Generation { .. } | AppError::WriteFailure { .. } | AppError::Storage(_) => {
                None
            }
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status().unwrap_or(DEFAULT_ERROR_STATUS)
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status)
            .content_type(mime::TEXT_PLAIN_UTF_8)
            .body(format!("ERROR: {}", status.as_u16()))
    }
}
