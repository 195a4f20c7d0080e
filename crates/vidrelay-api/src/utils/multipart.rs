//! Multipart upload form extraction.
//!
//! The file part is streamed to a request-scoped temporary file; text fields are
//! collected as-is. Validation happens afterwards in [`UploadForm::into_request`] so
//! the checks run in a fixed order regardless of field order in the body.

use crate::services::upload::UploadRequest;
use axum::extract::Multipart;
use std::path::Path;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use vidrelay_core::models::parse_tags;
use vidrelay_core::{AppError, PublishMode, ShopLinks};

/// Field names accepted for the file part
const FILE_FIELDS: [&str; 2] = ["video", "file"];
const MAX_EXTENSION_LEN: usize = 10;

/// Uploaded file buffered on disk; the file is deleted when this is dropped.
#[derive(Debug)]
pub struct BufferedFile {
    temp: NamedTempFile,
    pub original_name: String,
    pub size: u64,
}

impl BufferedFile {
    pub fn path(&self) -> &Path {
        self.temp.path()
    }
}

#[derive(Debug, Default)]
pub enum FilePart {
    #[default]
    Missing,
    /// A file part arrived without a filename (nothing selected client-side)
    Unnamed,
    Buffered(BufferedFile),
}

#[derive(Debug, Default)]
pub struct UploadForm {
    pub title: Option<String>,
    pub tags: Option<String>,
    pub platform: Option<String>,
    pub shopee: Option<String>,
    pub lazada: Option<String>,
    pub tiktok: Option<String>,
    pub file: FilePart,
}

impl UploadForm {
    /// Validate presence checks in order: file, filename, title, then platform.
    pub fn into_request(self) -> Result<UploadRequest, AppError> {
        let file = match self.file {
            FilePart::Missing => {
                return Err(AppError::MissingFile("No video file provided".to_string()))
            }
            FilePart::Unnamed => return Err(AppError::MissingFile("No file selected".to_string())),
            FilePart::Buffered(file) => file,
        };

        let title = self.title.as_deref().map(str::trim).unwrap_or_default();
        if title.is_empty() {
            return Err(AppError::MissingTitle);
        }

        let mode = self
            .platform
            .as_deref()
            .unwrap_or_default()
            .parse::<PublishMode>()
            .map_err(AppError::InvalidInput)?;

        let tags = self.tags.unwrap_or_default();
        Ok(UploadRequest {
            title: title.to_string(),
            tag_list: parse_tags(tags.trim()),
            tags,
            mode,
            shop_links: ShopLinks::from_form(self.shopee, self.lazada, self.tiktok),
            file,
        })
    }
}

/// Read the whole multipart body, buffering the file part under `temp_dir`.
pub async fn read_upload_form(
    mut multipart: Multipart,
    temp_dir: &Path,
) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        if FILE_FIELDS.contains(&field_name.as_str()) {
            if !matches!(form.file, FilePart::Missing) {
                return Err(AppError::InvalidInput(
                    "Multiple file fields are not allowed; send exactly one video file".to_string(),
                ));
            }

            let original_name = field
                .file_name()
                .map(|s| s.trim().to_string())
                .unwrap_or_default();
            if original_name.is_empty() {
                form.file = FilePart::Unnamed;
                continue;
            }

            let temp = tempfile::Builder::new()
                .prefix("vidrelay-")
                .suffix(&extension_suffix(&original_name))
                .tempfile_in(temp_dir)
                .map_err(|e| AppError::Internal(format!("Failed to create temp file: {}", e)))?;
            let mut writer = tokio::fs::File::from_std(temp.reopen()?);

            let mut size: u64 = 0;
            while let Some(chunk) = field
                .chunk()
                .await
                .map_err(|e| AppError::InvalidInput(format!("Failed to read file data: {}", e)))?
            {
                writer.write_all(&chunk).await?;
                size += chunk.len() as u64;
            }
            writer.flush().await?;
            drop(writer);

            tracing::debug!(
                file_name = %original_name,
                size_bytes = size,
                temp_path = %temp.path().display(),
                "Upload buffered to temporary file"
            );
            form.file = FilePart::Buffered(BufferedFile {
                temp,
                original_name,
                size,
            });
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::InvalidInput(format!("Failed to read field '{}': {}", field_name, e)))?;
        match field_name.as_str() {
            "title" => form.title = Some(value),
            "tags" => form.tags = Some(value),
            "platform" => form.platform = Some(value),
            "shopee" => form.shopee = Some(value),
            "lazada" => form.lazada = Some(value),
            "tiktok" => form.tiktok = Some(value),
            other => tracing::debug!(field = %other, "Ignoring unknown form field"),
        }
    }

    Ok(form)
}

/// `.ext` of the original filename, restricted to short alphanumeric extensions.
fn extension_suffix(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| ext.len() <= MAX_EXTENSION_LEN && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_lowercase()))
        .unwrap_or_default()
}
