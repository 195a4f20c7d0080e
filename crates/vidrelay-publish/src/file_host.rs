//! Gofile-compatible file host client

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client};
use serde_json::Value;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::Path;
use std::time::{Duration, Instant};
use tokio_util::io::ReaderStream;
use vidrelay_core::FileHostConfig;

use crate::retry::{retry_with_backoff, RetryPolicy};
use crate::traits::{FileHost, PublishError, PublishResult};

const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Two-step file host client: discover an upload server, then stream the file to it.
pub struct GofileClient {
    http_client: Client,
    api_url: String,
    upload_url_template: String,
    token: Option<String>,
    upload_timeout: Duration,
    link_timeout: Duration,
    retry: RetryPolicy,
}

impl Debug for GofileClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GofileClient")
            .field("api_url", &self.api_url)
            .field("has_token", &self.token.is_some())
            .finish()
    }
}

/// What the host reports for a finished upload
#[derive(Debug, Clone, PartialEq, Eq)]
struct UploadedFile {
    id: Option<String>,
    download_page: String,
}

impl GofileClient {
    pub fn new(config: &FileHostConfig) -> PublishResult<Self> {
        // Per-request timeouts are set on each call; the upload needs a much longer one.
        let http_client = Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| PublishError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        if config.token.is_none() {
            tracing::warn!("FILE_HOST_TOKEN is not set, file-host uploads will be anonymous");
        }

        Ok(Self {
            http_client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            upload_url_template: config.upload_url_template.clone(),
            token: config.token.clone(),
            upload_timeout: Duration::from_secs(config.upload_timeout_secs),
            link_timeout: Duration::from_secs(config.link_timeout_secs),
            retry: RetryPolicy::with_max_retries(config.max_retries),
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Ask the host which server should receive the upload.
    pub async fn discover_server(&self) -> PublishResult<String> {
        let result =
            retry_with_backoff(&self.retry, "file_host.discover_server", move || self.fetch_server())
                .await;

        match result {
            Err(PublishError::Transport(message)) => Err(PublishError::NoServerAvailable(message)),
            other => other,
        }
    }

    async fn fetch_server(&self) -> PublishResult<String> {
        let url = format!("{}/servers", self.api_url);
        let response = self
            .authorize(self.http_client.get(&url))
            .timeout(DISCOVERY_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if status.is_server_error() {
            return Err(PublishError::Transport(format!(
                "server discovery returned {}",
                status
            )));
        }
        if !status.is_success() {
            return Err(PublishError::NoServerAvailable(format!(
                "server discovery returned {}",
                status
            )));
        }

        let body: Value = response.json().await?;
        server_from_response(&body).ok_or_else(|| {
            PublishError::NoServerAvailable("no upload server in discovery response".to_string())
        })
    }

    async fn upload_to(
        &self,
        server: &str,
        path: &Path,
        file_name: &str,
    ) -> PublishResult<UploadedFile> {
        let url = self.upload_url_template.replace("{server}", server);

        let file = tokio::fs::File::open(path).await?;
        let size = file.metadata().await?.len();
        let body = Body::wrap_stream(ReaderStream::new(file));
        let part = Part::stream_with_length(body, size)
            .file_name(file_name.to_string())
            .mime_str("application/octet-stream")
            .map_err(|e| PublishError::Transport(e.to_string()))?;
        let form = Form::new().part("file", part);

        let response = self
            .authorize(self.http_client.post(&url))
            .timeout(self.upload_timeout)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PublishError::UploadTimeout(self.upload_timeout)
                } else {
                    PublishError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        let body: Value = match response.json().await {
            Ok(body) => body,
            Err(_) if !status.is_success() => Value::Null,
            Err(e) => return Err(PublishError::UploadRejected(format!("invalid response: {}", e))),
        };

        if !status.is_success() {
            let message = service_message(&body).unwrap_or_else(|| format!("HTTP {}", status));
            return Err(PublishError::UploadRejected(message));
        }

        parse_upload_response(&body)
    }

    /// Look up the direct download link, falling back to the download page.
    async fn resolve_link(&self, uploaded: UploadedFile) -> String {
        let Some(id) = uploaded.id.as_deref() else {
            return uploaded.download_page;
        };

        let url = format!("{}/contents/{}", self.api_url, id);
        let lookup = async {
            let response = self.authorize(self.http_client.get(&url)).send().await?;
            if !response.status().is_success() {
                return Ok::<_, reqwest::Error>(None);
            }
            let body: Value = response.json().await?;
            Ok(find_direct_link(&body))
        };

        match tokio::time::timeout(self.link_timeout, lookup).await {
            Ok(Ok(Some(link))) => link,
            Ok(Ok(None)) => uploaded.download_page,
            Ok(Err(e)) => {
                tracing::debug!(error = %e, content_id = %id, "Direct link lookup failed");
                uploaded.download_page
            }
            Err(_) => {
                tracing::debug!(content_id = %id, "Direct link lookup timed out");
                uploaded.download_page
            }
        }
    }
}

#[async_trait]
impl FileHost for GofileClient {
    async fn publish(&self, path: &Path, file_name: &str) -> PublishResult<String> {
        let start = Instant::now();
        let server = self.discover_server().await?;
        tracing::debug!(server = %server, file_name = %file_name, "Uploading to file host");

        let uploaded = self.upload_to(&server, path, file_name).await?;
        let url = self.resolve_link(uploaded).await;

        tracing::info!(
            server = %server,
            url = %url,
            duration_ms = start.elapsed().as_millis() as u64,
            "File host upload successful"
        );
        Ok(url)
    }
}

/// `{data: {servers: [{name}]}}`, or the legacy `{data: {server}}`.
fn server_from_response(body: &Value) -> Option<String> {
    let data = body.get("data")?;
    data.get("servers")
        .and_then(Value::as_array)
        .and_then(|servers| servers.first())
        .and_then(|server| server.get("name"))
        .or_else(|| data.get("server"))
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .map(String::from)
}

fn service_message(body: &Value) -> Option<String> {
    body.get("message")
        .or_else(|| body.get("status"))
        .and_then(Value::as_str)
        .map(String::from)
}

fn parse_upload_response(body: &Value) -> PublishResult<UploadedFile> {
    if body.get("status").and_then(Value::as_str) != Some("ok") {
        let message = service_message(body).unwrap_or_else(|| "unknown error".to_string());
        return Err(PublishError::UploadRejected(message));
    }

    let data = body
        .get("data")
        .ok_or_else(|| PublishError::UploadRejected("response has no data".to_string()))?;
    let download_page = data
        .get("downloadPage")
        .and_then(Value::as_str)
        .ok_or_else(|| PublishError::UploadRejected("response has no downloadPage".to_string()))?
        .to_string();
    let id = data
        .get("id")
        .or_else(|| data.get("fileId"))
        .and_then(Value::as_str)
        .map(String::from);

    Ok(UploadedFile { id, download_page })
}

/// Search a contents response for `directLink`, then `link`.
pub fn find_direct_link(body: &Value) -> Option<String> {
    find_string_field(body, "directLink").or_else(|| find_string_field(body, "link"))
}

fn find_string_field(value: &Value, key: &str) -> Option<String> {
    match value {
        Value::Object(map) => {
            if let Some(found) = map.get(key).and_then(Value::as_str) {
                if !found.is_empty() {
                    return Some(found.to_string());
                }
            }
            map.values().find_map(|v| find_string_field(v, key))
        }
        Value::Array(items) => items.iter().find_map(|v| find_string_field(v, key)),
        _ => None,
    }
}
