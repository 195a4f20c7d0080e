//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Domain errors are
//! converted into `AppError` first so every failure renders with the same body
//! shape, status and log level.

use axum::{
    extract::multipart::MultipartRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use vidrelay_core::{AppError, ErrorMetadata, LogLevel, Source};
use vidrelay_publish::PublishError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}

/// Wrapper type for AppError to implement IntoResponse
/// (orphan rules: AppError lives in vidrelay-core)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

/// A body the multipart extractor cannot read carries no file part.
impl From<MultipartRejection> for HttpAppError {
    fn from(rejection: MultipartRejection) -> Self {
        tracing::debug!(rejection = %rejection.body_text(), "Upload body is not multipart");
        HttpAppError(AppError::MissingFile("No video file provided".to_string()))
    }
}

/// Map a publisher failure onto the request-level error for `target`.
pub fn publish_error(target: Source, err: PublishError) -> AppError {
    match err {
        PublishError::AuthenticationRequired(msg) => AppError::AuthenticationRequired(msg),
        other => AppError::publish(target, other.to_string()),
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        // Sensitive messages never leave the process in production.
        let is_production = is_production_env();
        let body = ErrorResponse {
            error: if is_production && app_error.is_sensitive() {
                "Internal server error".to_string()
            } else {
                app_error.client_message()
            },
            code: app_error.error_code().to_string(),
            error_type: (!is_production && !app_error.is_sensitive())
                .then(|| app_error.error_type().to_string()),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authentication_failures_keep_their_own_variant() {
        let err = publish_error(
            Source::VideoPlatform,
            PublishError::AuthenticationRequired("no refresh token".to_string()),
        );
        assert!(matches!(err, AppError::AuthenticationRequired(_)));
        assert!(err.to_string().contains("video-platform"));
    }

    #[test]
    fn test_publish_failures_name_the_target() {
        let err = publish_error(
            Source::FileHost,
            PublishError::NoServerAvailable("discovery returned 503".to_string()),
        );
        assert_eq!(err.error_code(), "PUBLISH_ERROR");
        assert!(err.to_string().starts_with("file-host upload error"));
    }

    #[test]
    fn test_error_response_shape() {
        let response = ErrorResponse {
            error: "Video title is required".to_string(),
            code: "MISSING_TITLE".to_string(),
            error_type: None,
        };
        let json = serde_json::to_value(&response).expect("serialize");
        assert_eq!(json["error"], "Video title is required");
        assert_eq!(json["code"], "MISSING_TITLE");
        assert!(json.get("error_type").is_none());
    }
}
