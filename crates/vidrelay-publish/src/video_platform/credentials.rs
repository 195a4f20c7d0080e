//! OAuth2 credentials for the video platform.
//!
//! Consent happens out of band; at runtime only a refresh-capable credential is used.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Deserialize;
use std::path::Path;
use vidrelay_core::VideoPlatformConfig;

use crate::traits::{PublishError, PublishResult};

/// Access tokens are treated as expired this long before their real expiry
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Refresh-capable OAuth2 client credentials.
#[derive(Clone, Default, Deserialize)]
pub struct OAuthCredentials {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Previously issued access token, if the credential file cached one
    #[serde(default, alias = "token")]
    pub access_token: Option<String>,
    #[serde(default, alias = "expiry")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("client_id", &self.client_id)
            .field("has_client_secret", &self.client_secret.is_some())
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl OAuthCredentials {
    /// Merge the credentials file (when configured) with environment values.
    ///
    /// Values from the environment win over values from the file.
    pub async fn load(config: &VideoPlatformConfig) -> PublishResult<Self> {
        let mut credentials = match &config.credentials_file {
            Some(path) => Self::from_file(path).await?,
            None => Self::default(),
        };

        if config.client_id.is_some() {
            credentials.client_id = config.client_id.clone();
        }
        if config.client_secret.is_some() {
            credentials.client_secret = config.client_secret.clone();
        }
        if config.refresh_token.is_some() {
            credentials.refresh_token = config.refresh_token.clone();
        }

        Ok(credentials)
    }

    /// Read a JSON credential file. A missing file is an empty credential.
    pub async fn from_file(path: &Path) -> PublishResult<Self> {
        let raw = match tokio::fs::read(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "Video platform credentials file not found");
                return Ok(Self::default());
            }
            Err(e) => return Err(PublishError::Io(e)),
        };

        serde_json::from_slice(&raw).map_err(|e| {
            PublishError::AuthenticationRequired(format!(
                "invalid credentials file {}: {}",
                path.display(),
                e
            ))
        })
    }

    pub fn can_refresh(&self) -> bool {
        self.refresh_token.is_some() && self.client_id.is_some() && self.client_secret.is_some()
    }

    /// Access token from the credential file, if it carries a known expiry.
    pub fn cached_token(&self) -> Option<AccessToken> {
        Some(AccessToken {
            value: self.access_token.clone()?,
            expires_at: self.expires_at?,
        })
    }
}

/// Bearer token with its expiry.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(value: String, expires_in_secs: i64, now: DateTime<Utc>) -> Self {
        Self {
            value,
            expires_at: now + ChronoDuration::seconds(expires_in_secs),
        }
    }

    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + ChronoDuration::seconds(EXPIRY_MARGIN_SECS) < self.expires_at
    }
}
