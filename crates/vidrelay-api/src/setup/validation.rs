//! Configuration validation
//!
//! Validates configuration at startup to catch misconfigurations early. Missing
//! publisher credentials are only warned about: the server still serves the
//! list and the other publisher.

use anyhow::Result;
use vidrelay_core::Config;

/// Validate configuration values
///
/// # Returns
/// Ok(()) if validation passes, Err with details if validation fails
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    if config.file_host.token.is_none() {
        tracing::warn!("FILE_HOST_TOKEN not set - file-host uploads may be rejected");
    }

    let platform = &config.video_platform;
    let has_env_credential = platform.client_id.is_some()
        && platform.client_secret.is_some()
        && platform.refresh_token.is_some();
    if !has_env_credential && platform.credentials_file.is_none() {
        tracing::warn!(
            "No video platform credential configured (YOUTUBE_* or YOUTUBE_CREDENTIALS_FILE) - \
            video-platform uploads will fail with an authentication error"
        );
    }

    if let Some(dir) = &config.temp_dir {
        if !dir.is_dir() {
            return Err(anyhow::anyhow!(
                "TEMP_DIR {} does not exist or is not a directory",
                dir.display()
            ));
        }
    }

    Ok(())
}
