//! Error types for Dropshare.

use thiserror::Error;

/// Common error type for Dropshare.
#[derive(Error, Debug)]
pub enum ShareError {
    /// Database error.
    ///
    /// Errors from sqlx are converted into this variant.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Validation error for client input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Malformed file identifier.
    #[error("invalid file id: {0}")]
    InvalidId(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// The operation is not currently allowed.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Upload exceeds the configured size limit.
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    /// Upload has a MIME type outside the allow-list.
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// Storage backend failure (local disk or asset host).
    #[error("storage error: {0}")]
    Storage(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for ShareError {
    fn from(e: sqlx::Error) -> Self {
        ShareError::Database(e.to_string())
    }
}

impl From<reqwest::Error> for ShareError {
    fn from(e: reqwest::Error) -> Self {
        ShareError::Storage(e.to_string())
    }
}

/// Result type alias for Dropshare operations.
pub type Result<T> = std::result::Result<T, ShareError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ShareError::Validation("no file uploaded".to_string());
        assert_eq!(err.to_string(), "validation error: no file uploaded");
    }

    #[test]
    fn test_not_found_error_display() {
        let err = ShareError::NotFound("File".to_string());
        assert_eq!(err.to_string(), "File not found");
    }

    #[test]
    fn test_invalid_id_display() {
        let err = ShareError::InvalidId("xyz".to_string());
        assert_eq!(err.to_string(), "invalid file id: xyz");
    }

    #[test]
    fn test_forbidden_display() {
        let err = ShareError::Forbidden("uploader offline".to_string());
        assert_eq!(err.to_string(), "forbidden: uploader offline");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ShareError = io_err.into();
        assert!(matches!(err, ShareError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_sqlx_error_conversion() {
        let err: ShareError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, ShareError::Database(_)));
    }

    #[test]
    fn test_result_alias() {
        fn sample_ok() -> Result<i32> {
            Ok(42)
        }

        fn sample_err() -> Result<i32> {
            Err(ShareError::Storage("upload rejected".to_string()))
        }

        assert_eq!(sample_ok().unwrap(), 42);
        assert!(sample_err().is_err());
    }
}
