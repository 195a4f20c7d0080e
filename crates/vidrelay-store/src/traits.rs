//! Metadata store abstraction trait

use crate::StoreBackend;
use async_trait::async_trait;
use thiserror::Error;
use vidrelay_core::UploadRecord;

/// Store operation errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid stored document: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Remote store error: {0}")]
    Remote(String),

    /// The store changed between load and save
    #[error("Store was modified concurrently (expected version {expected})")]
    Conflict { expected: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// The persisted list plus the version it was read at.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Most recent first
    pub records: Vec<UploadRecord>,
    /// Opaque version token; `None` when the backend cannot report one
    pub version: Option<String>,
}

/// Metadata store abstraction
///
/// Backends overwrite the whole collection on `save`. The upload service only
/// depends on this trait, so backends can be swapped by configuration.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Load the full list. A store that does not exist yet yields an empty list.
    async fn load(&self) -> StoreResult<Snapshot>;

    /// Replace the full list.
    ///
    /// When `expected_version` is set and the stored version differs, nothing is
    /// written and `StoreError::Conflict` is returned.
    async fn save(&self, records: &[UploadRecord], expected_version: Option<&str>)
        -> StoreResult<()>;

    /// Get the store backend type
    fn backend_type(&self) -> StoreBackend;

    /// Insert a record at the head of the list.
    ///
    /// Runs load, insert, save under the loaded version and starts over on
    /// conflict, at most `max_attempts` times.
    async fn prepend(&self, record: &UploadRecord, max_attempts: u32) -> StoreResult<()> {
        let max_attempts = max_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            let Snapshot {
                mut records,
                version,
            } = self.load().await?;
            records.insert(0, record.clone());

            match self.save(&records, version.as_deref()).await {
                Err(StoreError::Conflict { expected }) if attempt < max_attempts => {
                    tracing::warn!(
                        record_id = record.id,
                        attempt,
                        expected_version = %expected,
                        "Metadata store changed during write, retrying"
                    );
                }
                result => return result,
            }
        }
    }
}
