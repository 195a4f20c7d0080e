//! Vidrelay Publish Library
//!
//! Clients for the two external destinations an upload can be published to:
//!
//! - a Gofile-compatible file host ([`GofileClient`])
//! - the YouTube Data API resumable upload endpoint ([`YouTubePublisher`])
//!
//! Both stream the file from disk and report failures as [`PublishError`].

pub mod file_host;
pub mod retry;
pub mod traits;
pub mod video_platform;

pub use file_host::GofileClient;
pub use retry::RetryPolicy;
pub use traits::{FileHost, PublishError, PublishResult, VideoDetails, VideoPlatform};
pub use video_platform::{OAuthCredentials, YouTubePublisher};
