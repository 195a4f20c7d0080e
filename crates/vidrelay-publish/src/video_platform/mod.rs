//! YouTube Data API publisher using the resumable upload protocol.

pub mod credentials;

pub use credentials::{AccessToken, OAuthCredentials};

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{CONTENT_RANGE, LOCATION, RANGE};
use reqwest::{redirect, Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncSeekExt, SeekFrom};
use tokio::sync::Mutex;
use vidrelay_core::VideoPlatformConfig;

use crate::traits::{PublishError, PublishResult, VideoDetails, VideoPlatform};

/// Upload chunks must be a multiple of this size
const CHUNK_GRANULARITY: usize = 256 * 1024;
/// Consecutive `308` responses without progress before giving up
const MAX_STALLED_CHUNKS: u32 = 3;
const API_TIMEOUT: Duration = Duration::from_secs(60);
const CHUNK_TIMEOUT: Duration = Duration::from_secs(600);

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

#[derive(Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

#[derive(Deserialize)]
struct VideoResource {
    id: String,
}

pub struct YouTubePublisher {
    http_client: Client,
    credentials: OAuthCredentials,
    token: Mutex<Option<AccessToken>>,
    token_url: String,
    upload_url: String,
    watch_url: String,
    chunk_size: usize,
}

impl std::fmt::Debug for YouTubePublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YouTubePublisher")
            .field("credentials", &self.credentials)
            .field("upload_url", &self.upload_url)
            .field("chunk_size", &self.chunk_size)
            .finish()
    }
}

impl YouTubePublisher {
    pub fn new(config: &VideoPlatformConfig, credentials: OAuthCredentials) -> PublishResult<Self> {
        // Resumable uploads answer 308 without a Location; never follow redirects.
        let http_client = Client::builder()
            .redirect(redirect::Policy::none())
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| PublishError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        if !credentials.can_refresh() && credentials.cached_token().is_none() {
            tracing::warn!(
                "Video platform credentials are incomplete, video-platform uploads will fail until authorized"
            );
        }

        let token = Mutex::new(credentials.cached_token());
        Ok(Self {
            http_client,
            credentials,
            token,
            token_url: config.token_url.clone(),
            upload_url: config.upload_url.clone(),
            watch_url: config.watch_url.clone(),
            chunk_size: chunk_size_for(config.chunk_size_bytes),
        })
    }

    /// Build a publisher with credentials loaded from the environment and credential file.
    pub async fn from_config(config: &VideoPlatformConfig) -> PublishResult<Self> {
        let credentials = OAuthCredentials::load(config).await?;
        Self::new(config, credentials)
    }

    /// Current access token, refreshing it when missing or about to expire.
    async fn access_token(&self) -> PublishResult<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(Utc::now())) {
            return Ok(token.value.clone());
        }

        let token = self.refresh_access_token().await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    async fn refresh_access_token(&self) -> PublishResult<AccessToken> {
        let (Some(client_id), Some(client_secret), Some(refresh_token)) = (
            self.credentials.client_id.as_deref(),
            self.credentials.client_secret.as_deref(),
            self.credentials.refresh_token.as_deref(),
        ) else {
            return Err(PublishError::AuthenticationRequired(
                "no refresh-capable credential configured".to_string(),
            ));
        };

        let response = self
            .http_client
            .post(&self.token_url)
            .timeout(API_TIMEOUT)
            .form(&[
                ("grant_type", "refresh_token"),
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await?;

        let status = response.status();
        if status.is_client_error() {
            let detail = match response.json::<TokenErrorResponse>().await {
                Ok(err) => match err.error_description {
                    Some(description) => format!("{}: {}", err.error, description),
                    None => err.error,
                },
                Err(_) => format!("token endpoint returned {}", status),
            };
            return Err(PublishError::AuthenticationRequired(detail));
        }
        if !status.is_success() {
            return Err(PublishError::Transport(format!(
                "token endpoint returned {}",
                status
            )));
        }

        let body: TokenResponse = response.json().await?;
        tracing::debug!(expires_in = body.expires_in, "Refreshed video platform access token");
        Ok(AccessToken::new(body.access_token, body.expires_in, Utc::now()))
    }

    /// Open a resumable upload session and return its URL.
    async fn start_session(
        &self,
        access_token: &str,
        size: u64,
        details: &VideoDetails,
    ) -> PublishResult<String> {
        let metadata = json!({
            "snippet": {
                "title": details.title,
                "description": details.description,
                "tags": details.tags,
                "categoryId": details.category_id,
            },
            "status": {
                "privacyStatus": details.privacy_status,
                "selfDeclaredMadeForKids": false,
            },
        });

        let response = self
            .http_client
            .post(&self.upload_url)
            .query(&[("uploadType", "resumable"), ("part", "snippet,status")])
            .bearer_auth(access_token)
            .header("X-Upload-Content-Length", size)
            .header("X-Upload-Content-Type", "video/*")
            .timeout(API_TIMEOUT)
            .json(&metadata)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            // the next upload has to refresh instead of reusing a revoked token
            *self.token.lock().await = None;
            return Err(PublishError::AuthenticationRequired(
                "access token was rejected".to_string(),
            ));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::UploadRejected(format!(
                "session start returned {}: {}",
                status, body
            )));
        }

        response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
            .ok_or_else(|| {
                PublishError::UploadRejected("session start response has no Location".to_string())
            })
    }

    /// Send the file in chunks and return the new video id.
    async fn upload_chunks(
        &self,
        access_token: &str,
        session_url: &str,
        path: &Path,
        size: u64,
    ) -> PublishResult<String> {
        let mut file = tokio::fs::File::open(path).await?;
        let mut offset: u64 = 0;
        let mut stalled = 0;

        loop {
            let len = (size - offset).min(self.chunk_size as u64) as usize;
            let mut chunk = vec![0u8; len];
            file.seek(SeekFrom::Start(offset)).await?;
            file.read_exact(&mut chunk).await?;

            let end = offset + len as u64 - 1;
            let response = self
                .http_client
                .put(session_url)
                .bearer_auth(access_token)
                .header(CONTENT_RANGE, format!("bytes {}-{}/{}", offset, end, size))
                .timeout(CHUNK_TIMEOUT)
                .body(chunk)
                .send()
                .await
                .map_err(|e| {
                    PublishError::UploadInterrupted(format!("chunk at offset {}: {}", offset, e))
                })?;

            let status = response.status();
            match status.as_u16() {
                200 | 201 => {
                    let video: VideoResource = response.json().await.map_err(|e| {
                        PublishError::UploadInterrupted(format!("invalid final response: {}", e))
                    })?;
                    return Ok(video.id);
                }
                308 => {
                    let next = next_offset(
                        response.headers().get(RANGE).and_then(|v| v.to_str().ok()),
                    );
                    if next <= offset {
                        stalled += 1;
                        if stalled >= MAX_STALLED_CHUNKS {
                            return Err(PublishError::UploadInterrupted(format!(
                                "no progress past offset {}",
                                offset
                            )));
                        }
                    } else {
                        stalled = 0;
                    }
                    if next >= size {
                        return Err(PublishError::UploadInterrupted(
                            "all bytes sent but upload was not finalized".to_string(),
                        ));
                    }
                    offset = next;

                    tracing::debug!(
                        uploaded_bytes = offset,
                        total_bytes = size,
                        progress_pct = offset * 100 / size.max(1),
                        "Video platform upload progress"
                    );
                }
                _ => {
                    let body = response.text().await.unwrap_or_default();
                    return Err(PublishError::UploadInterrupted(format!(
                        "chunk at offset {} returned {}: {}",
                        offset, status, body
                    )));
                }
            }
        }
    }

    fn watch_url_for(&self, video_id: &str) -> String {
        format!("{}?v={}", self.watch_url, video_id)
    }
}

#[async_trait]
impl VideoPlatform for YouTubePublisher {
    async fn publish(&self, path: &Path, details: &VideoDetails) -> PublishResult<String> {
        let start = Instant::now();
        let size = tokio::fs::metadata(path).await?.len();
        if size == 0 {
            return Err(PublishError::UploadRejected("video file is empty".to_string()));
        }

        let access_token = self.access_token().await?;
        let session_url = self.start_session(&access_token, size, details).await?;
        tracing::debug!(size_bytes = size, chunk_size = self.chunk_size, "Resumable upload session opened");

        let video_id = self
            .upload_chunks(&access_token, &session_url, path, size)
            .await?;
        let url = self.watch_url_for(&video_id);

        tracing::info!(
            video_id = %video_id,
            size_bytes = size,
            duration_ms = start.elapsed().as_millis() as u64,
            "Video platform upload successful"
        );
        Ok(url)
    }
}

/// Round a configured chunk size down to the required granularity.
fn chunk_size_for(configured: usize) -> usize {
    (configured / CHUNK_GRANULARITY).max(1) * CHUNK_GRANULARITY
}

/// Offset to resume from, given the `Range: bytes=0-N` header of a `308` response.
fn next_offset(range: Option<&str>) -> u64 {
    range
        .and_then(|r| r.trim().strip_prefix("bytes="))
        .and_then(|r| r.split('-').nth(1))
        .and_then(|last| last.trim().parse::<u64>().ok())
        .map(|last| last + 1)
        .unwrap_or(0)
}
