//! Construction of the store, publishers and upload service.

use crate::services::upload::{UploadService, UploadSettings};
use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use vidrelay_core::{Config, RecordIdGenerator};
use vidrelay_publish::{FileHost, GofileClient, VideoPlatform, YouTubePublisher};
use vidrelay_store::{create_store, MetadataStore};

/// Build the application state from configuration
pub async fn initialize_services(config: Config) -> Result<Arc<AppState>> {
    let store = create_store(&config).context("Failed to initialize metadata store")?;

    let file_host: Arc<dyn FileHost> = Arc::new(
        GofileClient::new(&config.file_host).context("Failed to initialize file host client")?,
    );
    let video_platform: Arc<dyn VideoPlatform> = Arc::new(
        YouTubePublisher::from_config(&config.video_platform)
            .await
            .context("Failed to initialize video platform publisher")?,
    );

    let ids = seed_id_generator(store.as_ref()).await;
    let uploads = UploadService::new(
        file_host,
        video_platform,
        store.clone(),
        ids,
        UploadSettings::from_config(&config),
    );

    Ok(Arc::new(AppState::new(config, uploads, store)))
}

/// Start ids above the highest one already stored.
pub async fn seed_id_generator(store: &dyn MetadataStore) -> RecordIdGenerator {
    match store.load().await {
        Ok(snapshot) => {
            let highest = snapshot.records.iter().map(|r| r.id).max().unwrap_or(0);
            tracing::info!(
                records = snapshot.records.len(),
                highest_id = highest,
                "Upload list loaded"
            );
            RecordIdGenerator::seeded(highest)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Could not read upload list at startup");
            RecordIdGenerator::new()
        }
    }
}
