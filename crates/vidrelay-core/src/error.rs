//! Error types module
//!
//! All request-level failures are unified under `AppError`. Publisher and store
//! crates keep their own error enums; the API crate maps them into `AppError`
//! before rendering.

use std::io;

use crate::models::Source;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "MISSING_FILE")
    fn error_code(&self) -> &'static str;

    /// Client-facing message
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    MissingFile(String),

    #[error("Video title is required")]
    MissingTitle,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{target} upload error: {message}")]
    Publish { target: Source, message: String },

    #[error("video-platform upload error: authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("Metadata store error: {0}")]
    Store(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn publish(target: Source, message: impl Into<String>) -> Self {
        AppError::Publish {
            target,
            message: message.into(),
        }
    }

    /// Short variant name used in structured logs.
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::MissingFile(_) => "MissingFile",
            AppError::MissingTitle => "MissingTitle",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::Publish { .. } => "PublishError",
            AppError::AuthenticationRequired(_) => "AuthenticationRequired",
            AppError::Store(_) => "StoreError",
            AppError::Internal(_) => "Internal",
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

/// (http_status, error_code, sensitive, log_level) per variant.
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, bool, LogLevel) {
    match err {
        AppError::MissingFile(_) => (400, "MISSING_FILE", false, LogLevel::Debug),
        AppError::MissingTitle => (400, "MISSING_TITLE", false, LogLevel::Debug),
        AppError::InvalidInput(_) => (400, "INVALID_INPUT", false, LogLevel::Debug),
        AppError::Publish { .. } => (500, "PUBLISH_ERROR", false, LogLevel::Error),
        AppError::AuthenticationRequired(_) => {
            (500, "AUTHENTICATION_REQUIRED", false, LogLevel::Warn)
        }
        AppError::Store(_) => (500, "STORE_ERROR", true, LogLevel::Error),
        AppError::Internal(_) => (500, "INTERNAL_ERROR", true, LogLevel::Error),
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn client_message(&self) -> String {
        self.to_string()
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_are_bad_requests() {
        let missing = AppError::MissingFile("No video file provided".to_string());
        assert_eq!(missing.http_status_code(), 400);
        assert_eq!(missing.error_code(), "MISSING_FILE");
        assert_eq!(missing.client_message(), "No video file provided");

        assert_eq!(AppError::MissingTitle.http_status_code(), 400);
        assert_eq!(AppError::MissingTitle.error_code(), "MISSING_TITLE");
    }

    #[test]
    fn test_publish_error_names_target() {
        let err = AppError::publish(Source::FileHost, "upload rejected: quota exceeded");
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(
            err.client_message(),
            "file-host upload error: upload rejected: quota exceeded"
        );
        assert!(!err.is_sensitive());
    }

    #[test]
    fn test_authentication_required_message() {
        let err = AppError::AuthenticationRequired("no refresh token configured".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert!(err.client_message().contains("authentication required"));
        assert_eq!(err.log_level(), LogLevel::Warn);
    }

    #[test]
    fn test_internal_errors_are_sensitive() {
        assert!(AppError::Internal("boom".into()).is_sensitive());
        assert!(AppError::Store("disk full".into()).is_sensitive());
    }
}
