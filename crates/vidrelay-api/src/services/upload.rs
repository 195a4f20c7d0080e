//! Upload orchestration: publish one buffered file and record the result.

use crate::error::publish_error;
use crate::utils::multipart::BufferedFile;
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use vidrelay_core::{
    AppError, Config, PublishMode, PublishedMedia, RecordIdGenerator, ShopLinks, Source,
    UploadRecord,
};
use vidrelay_publish::{FileHost, VideoDetails, VideoPlatform};
use vidrelay_store::MetadataStore;

/// Per-deployment values stamped onto every upload
#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub contact_url: String,
    pub storefront_url: Option<String>,
    pub category_id: String,
    pub privacy_status: String,
    pub store_write_attempts: u32,
}

impl UploadSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            contact_url: config.contact_url.clone(),
            storefront_url: config.storefront_url.clone(),
            category_id: config.video_platform.category_id.clone(),
            privacy_status: config.video_platform.privacy_status.clone(),
            store_write_attempts: config.store.write_attempts,
        }
    }
}

/// A validated upload request
#[derive(Debug)]
pub struct UploadRequest {
    pub title: String,
    /// Tags exactly as submitted
    pub tags: String,
    /// Tags split for the video platform
    pub tag_list: Vec<String>,
    pub mode: PublishMode,
    pub shop_links: ShopLinks,
    pub file: BufferedFile,
}

pub struct UploadService {
    file_host: Arc<dyn FileHost>,
    video_platform: Arc<dyn VideoPlatform>,
    store: Arc<dyn MetadataStore>,
    ids: RecordIdGenerator,
    settings: UploadSettings,
}

impl UploadService {
    pub fn new(
        file_host: Arc<dyn FileHost>,
        video_platform: Arc<dyn VideoPlatform>,
        store: Arc<dyn MetadataStore>,
        ids: RecordIdGenerator,
        settings: UploadSettings,
    ) -> Self {
        Self {
            file_host,
            video_platform,
            store,
            ids,
            settings,
        }
    }

    /// Publish the file per the request's mode and persist the new record.
    ///
    /// The video platform runs first when selected, then the file host. Any publish
    /// failure aborts before a record is built. A failure to persist the record is
    /// logged and does not fail the upload. The buffered file is removed when the
    /// request is dropped at the end of this call.
    pub async fn upload(&self, request: UploadRequest) -> Result<UploadRecord, AppError> {
        let start = Instant::now();
        let path = request.file.path();

        tracing::info!(
            title = %request.title,
            mode = %request.mode,
            file_name = %request.file.original_name,
            size_bytes = request.file.size,
            "Publishing upload"
        );

        let mut primary: Option<PublishedMedia> = None;
        let mut backup: Option<PublishedMedia> = None;

        if request.mode.includes_video_platform() {
            let details = VideoDetails {
                title: request.title.clone(),
                description: self.description(&request.title, &request.tags),
                tags: request.tag_list.clone(),
                category_id: self.settings.category_id.clone(),
                privacy_status: self.settings.privacy_status.clone(),
            };
            let url = self
                .video_platform
                .publish(path, &details)
                .await
                .map_err(|e| publish_error(Source::VideoPlatform, e))?;
            primary = Some(PublishedMedia::new(url, Source::VideoPlatform));
        }

        if request.mode.includes_file_host() {
            let url = self
                .file_host
                .publish(path, &request.file.original_name)
                .await
                .map_err(|e| publish_error(Source::FileHost, e))?;
            let media = PublishedMedia::new(url, Source::FileHost);
            if primary.is_none() {
                primary = Some(media);
            } else {
                backup = Some(media);
            }
        }

        let primary = primary
            .ok_or_else(|| AppError::Internal("no publisher selected for upload".to_string()))?;

        let record = UploadRecord::new(
            self.ids.next_id(),
            request.title,
            request.tags,
            primary,
            backup,
            request.shop_links,
            self.settings.contact_url.clone(),
            Utc::now(),
        );

        if let Err(e) = self
            .store
            .prepend(&record, self.settings.store_write_attempts)
            .await
        {
            tracing::error!(
                error = %e,
                record_id = record.id,
                video_url = %record.video_url,
                "Failed to persist upload record; media was published"
            );
        }

        tracing::info!(
            record_id = record.id,
            source = %record.source,
            video_url = %record.video_url,
            has_backup = record.backup.is_some(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Upload completed"
        );

        Ok(record)
    }

    /// Video description: title, tags, then the storefront and contact lines.
    pub fn description(&self, title: &str, tags: &str) -> String {
        let mut description = format!("{}\n\n{}", title, tags);
        description.push('\n');
        if let Some(storefront) = &self.settings.storefront_url {
            description.push_str(&format!("\n🛒 Shop: {}", storefront));
        }
        description.push_str(&format!("\n💬 Contact: {}", self.settings.contact_url));
        description
    }
}
