use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Where a media URL points to.
///
/// Older lists written with the service names (`gofile`, `youtube`) still load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    #[serde(rename = "file-host", alias = "gofile")]
    FileHost,
    #[serde(rename = "video-platform", alias = "youtube")]
    VideoPlatform,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::FileHost => "file-host",
            Source::VideoPlatform => "video-platform",
        }
    }
}

impl Display for Source {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Caller-selected publishing mode for one upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PublishMode {
    #[default]
    FileHost,
    VideoPlatform,
    /// Video platform is primary, file host is the backup
    Both,
}

impl PublishMode {
    pub fn includes_file_host(&self) -> bool {
        matches!(self, PublishMode::FileHost | PublishMode::Both)
    }

    pub fn includes_video_platform(&self) -> bool {
        matches!(self, PublishMode::VideoPlatform | PublishMode::Both)
    }
}

impl FromStr for PublishMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "file-host" | "gofile" => Ok(PublishMode::FileHost),
            "video-platform" | "youtube" => Ok(PublishMode::VideoPlatform),
            "both" => Ok(PublishMode::Both),
            other => Err(format!(
                "Invalid platform '{}'. Must be 'file-host', 'video-platform' or 'both'",
                other
            )),
        }
    }
}

impl Display for PublishMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            PublishMode::FileHost => write!(f, "file-host"),
            PublishMode::VideoPlatform => write!(f, "video-platform"),
            PublishMode::Both => write!(f, "both"),
        }
    }
}

/// URL returned by one publisher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMedia {
    pub url: String,
    pub source: Source,
}

impl PublishedMedia {
    pub fn new(url: impl Into<String>, source: Source) -> Self {
        Self {
            url: url.into(),
            source,
        }
    }
}

/// External shop links attached to a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopLinks {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub shopee: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub lazada: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub tiktok: Option<String>,
}

impl ShopLinks {
    /// Build from raw form values, treating blank values as absent.
    pub fn from_form(shopee: Option<String>, lazada: Option<String>, tiktok: Option<String>) -> Self {
        Self {
            shopee: non_blank(shopee),
            lazada: non_blank(lazada),
            tiktok: non_blank(tiktok),
        }
    }
}

/// Backup copy of the media; only present for dual-mode uploads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupLink {
    pub video_url_backup: String,
    pub source_backup: Source,
}

/// One persisted upload.
///
/// Records are created once by the upload service and never modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadRecord {
    pub id: u64,
    pub title: String,
    pub video_url: String,
    pub source: Source,
    #[serde(default)]
    pub tags: String,
    /// RFC 3339 creation timestamp. Kept as text so older naive timestamps still load.
    pub date: String,
    #[serde(default)]
    pub shop_links: ShopLinks,
    #[serde(default)]
    pub line_url: String,
    #[serde(flatten)]
    pub backup: Option<BackupLink>,
}

impl UploadRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: u64,
        title: impl Into<String>,
        tags: impl Into<String>,
        primary: PublishedMedia,
        backup: Option<PublishedMedia>,
        shop_links: ShopLinks,
        line_url: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            video_url: primary.url,
            source: primary.source,
            tags: tags.into(),
            date: created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            shop_links,
            line_url: line_url.into(),
            backup: backup.map(|b| BackupLink {
                video_url_backup: b.url,
                source_backup: b.source,
            }),
        }
    }
}

/// Split a free-form tag string into platform tags.
///
/// Tags are whitespace separated; `#` characters are removed and empty tags dropped.
pub fn parse_tags(tags: &str) -> Vec<String> {
    tags.split_whitespace()
        .map(|tag| tag.replace('#', ""))
        .filter(|tag| !tag.is_empty())
        .collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(non_blank(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn sample(backup: Option<PublishedMedia>) -> UploadRecord {
        UploadRecord::new(
            1_700_000_000_000,
            "Demo",
            "#cats #funny",
            PublishedMedia::new("https://www.youtube.com/watch?v=abc", Source::VideoPlatform),
            backup,
            ShopLinks::from_form(Some("https://shopee.example/1".into()), Some("  ".into()), None),
            "https://lin.ee/contact",
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_parse_tags_strips_hashes() {
        assert_eq!(parse_tags("#cats  #funny dogs #"), vec!["cats", "funny", "dogs"]);
        assert!(parse_tags("   ").is_empty());
    }

    #[test]
    fn test_publish_mode_parsing() {
        assert_eq!("".parse::<PublishMode>().unwrap(), PublishMode::FileHost);
        assert_eq!("gofile".parse::<PublishMode>().unwrap(), PublishMode::FileHost);
        assert_eq!("YouTube".parse::<PublishMode>().unwrap(), PublishMode::VideoPlatform);
        assert_eq!("both".parse::<PublishMode>().unwrap(), PublishMode::Both);
        assert!("vimeo".parse::<PublishMode>().is_err());
        assert!(PublishMode::Both.includes_file_host());
        assert!(PublishMode::Both.includes_video_platform());
        assert!(!PublishMode::FileHost.includes_video_platform());
    }

    #[test]
    fn test_record_without_backup_omits_backup_fields() {
        let value = serde_json::to_value(sample(None)).unwrap();
        assert_eq!(value["source"], "video-platform");
        assert_eq!(value["date"], "2024-05-01T12:00:00.000Z");
        assert_eq!(value["shop_links"]["shopee"], "https://shopee.example/1");
        assert!(value["shop_links"]["lazada"].is_null());
        assert!(value.get("video_url_backup").is_none());
        assert!(value.get("source_backup").is_none());
    }

    #[test]
    fn test_record_with_backup_serializes_flat() {
        let record = sample(Some(PublishedMedia::new(
            "https://gofile.io/d/xyz",
            Source::FileHost,
        )));
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["video_url_backup"], "https://gofile.io/d/xyz");
        assert_eq!(value["source_backup"], "file-host");

        let parsed: UploadRecord = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_legacy_record_loads() {
        let legacy = json!({
            "id": 1714557600,
            "title": "Old upload",
            "video_url": "https://gofile.io/d/old",
            "source": "gofile",
            "tags": "",
            "date": "2024-05-01T10:00:00.123456",
            "shop_links": { "shopee": "", "lazada": "", "tiktok": "" },
            "line_url": "https://lin.ee/contact"
        });
        let record: UploadRecord = serde_json::from_value(legacy).unwrap();
        assert_eq!(record.source, Source::FileHost);
        assert_eq!(record.shop_links, ShopLinks::default());
        assert!(record.backup.is_none());
    }
}
