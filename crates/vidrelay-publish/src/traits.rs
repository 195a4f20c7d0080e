//! Publisher abstraction traits

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Publisher errors
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("no upload server available: {0}")]
    NoServerAvailable(String),

    #[error("upload rejected: {0}")]
    UploadRejected(String),

    #[error("upload timed out after {}s", .0.as_secs())]
    UploadTimeout(Duration),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("upload interrupted: {0}")]
    UploadInterrupted(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PublishError {
    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, PublishError::Transport(_) | PublishError::UploadTimeout(_))
    }
}

impl From<reqwest::Error> for PublishError {
    fn from(err: reqwest::Error) -> Self {
        PublishError::Transport(err.to_string())
    }
}

/// Result type for publish operations
pub type PublishResult<T> = Result<T, PublishError>;

/// Metadata sent along with a video-platform upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoDetails {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub category_id: String,
    /// `public`, `private` or `unlisted`
    pub privacy_status: String,
}

/// Anonymous or token-authenticated file host
#[async_trait]
pub trait FileHost: Send + Sync {
    /// Upload the file and return a public URL for it.
    ///
    /// # Arguments
    /// * `path` - Local file to upload
    /// * `file_name` - Name the host should show for the file
    async fn publish(&self, path: &Path, file_name: &str) -> PublishResult<String>;
}

/// Video platform that requires an authorized account
#[async_trait]
pub trait VideoPlatform: Send + Sync {
    /// Upload the video and return its public watch URL.
    async fn publish(&self, path: &Path, details: &VideoDetails) -> PublishResult<String>;
}
