//! Remote JSON document store (JSONBin-compatible API)

use crate::traits::{MetadataStore, Snapshot, StoreError, StoreResult};
use crate::StoreBackend;
use async_trait::async_trait;
use reqwest::header::{ETAG, IF_MATCH};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use vidrelay_core::{RemoteStoreConfig, UploadRecord};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Stores the list as `{"videos": [...]}` in one remote document.
///
/// The document's `ETag` is used as the version and sent back as `If-Match`;
/// `412 Precondition Failed` maps to [`StoreError::Conflict`].
pub struct RemoteJsonStore {
    client: Client,
    base_url: String,
    bin_id: String,
    access_key: String,
}

#[derive(Serialize)]
struct Document<'a> {
    videos: &'a [UploadRecord],
}

impl RemoteJsonStore {
    pub fn new(config: &RemoteStoreConfig) -> StoreResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| StoreError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            bin_id: config.bin_id.clone(),
            access_key: config.access_key.clone(),
        })
    }

    fn document_url(&self) -> String {
        format!("{}/b/{}", self.base_url, self.bin_id)
    }
}

/// Pull the record list out of a fetched document.
///
/// Accepts the bare document, a metadata envelope (`{"record": {...}}`) and a
/// bare array. A document without a `videos` field is an empty list.
fn records_from_document(body: Value) -> StoreResult<Vec<UploadRecord>> {
    let document = match body {
        Value::Object(mut map) if map.contains_key("record") => {
            map.remove("record").unwrap_or(Value::Null)
        }
        other => other,
    };

    let videos = match document {
        Value::Array(items) => Value::Array(items),
        Value::Object(mut map) => map.remove("videos").unwrap_or(Value::Null),
        _ => Value::Null,
    };

    if videos.is_null() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_value(videos)?)
}

#[async_trait]
impl MetadataStore for RemoteJsonStore {
    async fn load(&self) -> StoreResult<Snapshot> {
        let url = format!("{}/latest", self.document_url());
        let response = self
            .client
            .get(&url)
            .header("X-Master-Key", &self.access_key)
            .header("X-Bin-Meta", "false")
            .send()
            .await
            .map_err(|e| StoreError::Remote(format!("Failed to fetch upload list: {}", e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::debug!(bin_id = %self.bin_id, "Remote upload list not found, starting empty");
            return Ok(Snapshot::default());
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Remote(format!(
                "Fetching upload list failed with status {}: {}",
                status, body
            )));
        }

        let version = response
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let body: Value = response
            .json()
            .await
            .map_err(|e| StoreError::Remote(format!("Invalid upload list response: {}", e)))?;

        Ok(Snapshot {
            records: records_from_document(body)?,
            version,
        })
    }

    async fn save(
        &self,
        records: &[UploadRecord],
        expected_version: Option<&str>,
    ) -> StoreResult<()> {
        let mut request = self
            .client
            .put(self.document_url())
            .header("X-Master-Key", &self.access_key)
            .json(&Document { videos: records });
        if let Some(version) = expected_version {
            request = request.header(IF_MATCH, version);
        }

        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Remote(format!("Failed to write upload list: {}", e)))?;

        let status = response.status();
        if status == StatusCode::PRECONDITION_FAILED {
            return Err(StoreError::Conflict {
                expected: expected_version.unwrap_or_default().to_string(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Remote(format!(
                "Writing upload list failed with status {}: {}",
                status, body
            )));
        }

        tracing::debug!(bin_id = %self.bin_id, records = records.len(), "Remote upload list written");
        Ok(())
    }

    fn backend_type(&self) -> StoreBackend {
        StoreBackend::Remote
    }
}
