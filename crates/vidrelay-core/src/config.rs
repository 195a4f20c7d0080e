//! Configuration module
//!
//! All settings come from the environment (optionally seeded from a `.env` file).
//! Secrets have no built-in fallback values.

use std::env;
use std::path::PathBuf;

use crate::store_types::StoreBackend;

const DEFAULT_PORT: u16 = 5000;
const MAX_UPLOAD_SIZE_MB: usize = 2048;
const STORE_WRITE_ATTEMPTS: u32 = 3;
const FILE_HOST_UPLOAD_TIMEOUT_SECS: u64 = 600;
const FILE_HOST_LINK_TIMEOUT_SECS: u64 = 10;
const FILE_HOST_MAX_RETRIES: u32 = 2;
const YOUTUBE_CHUNK_SIZE_MB: usize = 8;

const DEFAULT_CONTACT_URL: &str = "https://lin.ee/xehWIoVw";
const DEFAULT_VIDEOS_JSON_PATH: &str = "videos.json";
const DEFAULT_REMOTE_STORE_URL: &str = "https://api.jsonbin.io/v3";
const DEFAULT_FILE_HOST_API_URL: &str = "https://api.gofile.io";
const DEFAULT_FILE_HOST_UPLOAD_URL: &str = "https://{server}.gofile.io/contents/uploadfile";
const DEFAULT_YOUTUBE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const DEFAULT_YOUTUBE_UPLOAD_URL: &str = "https://www.googleapis.com/upload/youtube/v3/videos";
const DEFAULT_YOUTUBE_WATCH_URL: &str = "https://www.youtube.com/watch";

/// Remote JSON document store settings
#[derive(Clone, Debug)]
pub struct RemoteStoreConfig {
    pub base_url: String,
    pub bin_id: String,
    pub access_key: String,
}

/// Metadata store settings
#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub local_path: PathBuf,
    pub remote: Option<RemoteStoreConfig>,
    /// Attempts for one prepend when concurrent writers conflict
    pub write_attempts: u32,
}

/// File-host (Gofile-compatible) settings
#[derive(Clone, Debug)]
pub struct FileHostConfig {
    pub token: Option<String>,
    pub api_url: String,
    /// Upload endpoint; `{server}` is replaced with the discovered server name
    pub upload_url_template: String,
    pub upload_timeout_secs: u64,
    pub link_timeout_secs: u64,
    pub max_retries: u32,
}

/// Video-platform (YouTube Data API) settings
#[derive(Clone, Debug)]
pub struct VideoPlatformConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub refresh_token: Option<String>,
    pub credentials_file: Option<PathBuf>,
    pub token_url: String,
    pub upload_url: String,
    pub watch_url: String,
    pub category_id: String,
    pub privacy_status: String,
    pub chunk_size_bytes: usize,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub log_format: String,
    pub max_upload_size_bytes: usize,
    /// Directory for request-scoped upload buffers; system temp dir when unset
    pub temp_dir: Option<PathBuf>,
    /// Contact link stored on every record and appended to descriptions
    pub contact_url: String,
    pub storefront_url: Option<String>,
    pub store: StoreConfig,
    pub file_host: FileHostConfig,
    pub video_platform: VideoPlatformConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let get_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let server_port = match get("PORT") {
            Some(port) => port
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            None => DEFAULT_PORT,
        };

        let environment = get("ENVIRONMENT")
            .or_else(|| get("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins = get_or("CORS_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_upload_size_bytes = mib_to_bytes(
            "MAX_UPLOAD_SIZE_MB",
            get("MAX_UPLOAD_SIZE_MB")
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(MAX_UPLOAD_SIZE_MB),
        )?;
        let chunk_size_bytes = mib_to_bytes(
            "YOUTUBE_CHUNK_SIZE_MB",
            get("YOUTUBE_CHUNK_SIZE_MB")
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(YOUTUBE_CHUNK_SIZE_MB)
                .max(1),
        )?;

        let backend = match get("STORE_BACKEND") {
            Some(value) => value.parse::<StoreBackend>()?,
            None => StoreBackend::Local,
        };

        let remote = match (get("REMOTE_STORE_BIN_ID"), get("REMOTE_STORE_KEY")) {
            (Some(bin_id), Some(access_key)) => Some(RemoteStoreConfig {
                base_url: get_or("REMOTE_STORE_URL", DEFAULT_REMOTE_STORE_URL)
                    .trim_end_matches('/')
                    .to_string(),
                bin_id,
                access_key,
            }),
            _ => None,
        };

        if backend == StoreBackend::Remote && remote.is_none() {
            return Err(anyhow::anyhow!(
                "STORE_BACKEND=remote requires REMOTE_STORE_BIN_ID and REMOTE_STORE_KEY"
            ));
        }

        let store = StoreConfig {
            backend,
            local_path: PathBuf::from(get_or("VIDEOS_JSON_PATH", DEFAULT_VIDEOS_JSON_PATH)),
            remote,
            write_attempts: get("STORE_WRITE_RETRIES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(STORE_WRITE_ATTEMPTS)
                .max(1),
        };

        let file_host = FileHostConfig {
            token: get("FILE_HOST_TOKEN"),
            api_url: get_or("FILE_HOST_API_URL", DEFAULT_FILE_HOST_API_URL)
                .trim_end_matches('/')
                .to_string(),
            upload_url_template: get_or("FILE_HOST_UPLOAD_URL", DEFAULT_FILE_HOST_UPLOAD_URL),
            upload_timeout_secs: get("FILE_HOST_UPLOAD_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(FILE_HOST_UPLOAD_TIMEOUT_SECS),
            link_timeout_secs: get("FILE_HOST_LINK_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(FILE_HOST_LINK_TIMEOUT_SECS),
            max_retries: get("FILE_HOST_MAX_RETRIES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(FILE_HOST_MAX_RETRIES),
        };

        let video_platform = VideoPlatformConfig {
            client_id: get("YOUTUBE_CLIENT_ID"),
            client_secret: get("YOUTUBE_CLIENT_SECRET"),
            refresh_token: get("YOUTUBE_REFRESH_TOKEN"),
            credentials_file: get("YOUTUBE_CREDENTIALS_FILE").map(PathBuf::from),
            token_url: get_or("YOUTUBE_TOKEN_URL", DEFAULT_YOUTUBE_TOKEN_URL),
            upload_url: get_or("YOUTUBE_UPLOAD_URL", DEFAULT_YOUTUBE_UPLOAD_URL),
            watch_url: get_or("YOUTUBE_WATCH_URL", DEFAULT_YOUTUBE_WATCH_URL),
            category_id: get_or("YOUTUBE_CATEGORY_ID", "22"),
            privacy_status: get_or("YOUTUBE_PRIVACY_STATUS", "public").to_lowercase(),
            chunk_size_bytes,
        };

        Ok(Config {
            server_port,
            environment,
            cors_origins,
            log_format: get_or("LOG_FORMAT", "compact").to_lowercase(),
            max_upload_size_bytes,
            temp_dir: get("TEMP_DIR").map(PathBuf::from),
            contact_url: get_or("CONTACT_URL", DEFAULT_CONTACT_URL),
            storefront_url: get("STOREFRONT_URL"),
            store,
            file_host,
            video_platform,
        })
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// Directory used for request-scoped upload buffers
    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(env::temp_dir)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be greater than 0"));
        }

        if !matches!(
            self.video_platform.privacy_status.as_str(),
            "public" | "private" | "unlisted"
        ) {
            return Err(anyhow::anyhow!(
                "YOUTUBE_PRIVACY_STATUS must be 'public', 'private' or 'unlisted'"
            ));
        }

        if !self.file_host.upload_url_template.contains("{server}") {
            return Err(anyhow::anyhow!(
                "FILE_HOST_UPLOAD_URL must contain the {{server}} placeholder"
            ));
        }

        if self.is_production() && self.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        Ok(())
    }
}

fn mib_to_bytes(key: &str, mib: usize) -> Result<usize, anyhow::Error> {
    mib.checked_mul(1024 * 1024)
        .ok_or_else(|| anyhow::anyhow!("{} is too large", key))
}
