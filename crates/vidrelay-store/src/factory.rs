#[cfg(feature = "store-local")]
use crate::LocalJsonStore;
#[cfg(feature = "store-remote")]
use crate::RemoteJsonStore;
use crate::{MetadataStore, StoreBackend, StoreError, StoreResult};
use std::sync::Arc;
use vidrelay_core::Config;

/// Create a metadata store based on configuration
pub fn create_store(config: &Config) -> StoreResult<Arc<dyn MetadataStore>> {
    match config.store.backend {
        #[cfg(feature = "store-local")]
        StoreBackend::Local => {
            tracing::info!(path = %config.store.local_path.display(), "Using local upload list");
            Ok(Arc::new(LocalJsonStore::new(config.store.local_path.clone())))
        }

        #[cfg(not(feature = "store-local"))]
        StoreBackend::Local => Err(StoreError::ConfigError(
            "Local store backend not available (store-local feature not enabled)".to_string(),
        )),

        #[cfg(feature = "store-remote")]
        StoreBackend::Remote => {
            let remote = config.store.remote.as_ref().ok_or_else(|| {
                StoreError::ConfigError(
                    "REMOTE_STORE_BIN_ID and REMOTE_STORE_KEY must be configured".to_string(),
                )
            })?;
            tracing::info!(base_url = %remote.base_url, bin_id = %remote.bin_id, "Using remote upload list");
            Ok(Arc::new(RemoteJsonStore::new(remote)?))
        }

        #[cfg(not(feature = "store-remote"))]
        StoreBackend::Remote => Err(StoreError::ConfigError(
            "Remote store backend not available (store-remote feature not enabled)".to_string(),
        )),
    }
}
