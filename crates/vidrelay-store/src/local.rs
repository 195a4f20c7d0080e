use crate::traits::{MetadataStore, Snapshot, StoreError, StoreResult};
use crate::StoreBackend;
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use vidrelay_core::UploadRecord;

/// Version reported for a list file that does not exist yet
const ABSENT_VERSION: &str = "absent";

/// JSON file store
///
/// The list lives in a single pretty-printed JSON array. The version token is the
/// SHA-256 of the file contents, so any external edit also invalidates a pending
/// write. Writes go to a sibling `.tmp` file and are renamed into place.
pub struct LocalJsonStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl LocalJsonStore {
    /// Create a new LocalJsonStore instance
    ///
    /// # Arguments
    /// * `path` - Location of the list file (e.g., "videos.json"); it is created on first write
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "videos.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Read the raw file, `None` when it does not exist.
    async fn read_raw(&self) -> StoreResult<Option<Vec<u8>>> {
        match fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::IoError(e)),
        }
    }

    async fn write_atomic(&self, bytes: &[u8]) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let tmp = self.tmp_path();
        let mut file = fs::File::create(&tmp).await.map_err(|e| {
            StoreError::IoError(std::io::Error::new(
                e.kind(),
                format!("Failed to create {}: {}", tmp.display(), e),
            ))
        })?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

fn version_of(raw: Option<&[u8]>) -> String {
    match raw {
        Some(bytes) => hex::encode(Sha256::digest(bytes)),
        None => ABSENT_VERSION.to_string(),
    }
}

fn parse_records(raw: Option<&[u8]>) -> StoreResult<Vec<UploadRecord>> {
    match raw {
        Some(bytes) if !bytes.iter().all(u8::is_ascii_whitespace) => {
            Ok(serde_json::from_slice(bytes)?)
        }
        _ => Ok(Vec::new()),
    }
}

#[async_trait]
impl MetadataStore for LocalJsonStore {
    async fn load(&self) -> StoreResult<Snapshot> {
        let raw = self.read_raw().await?;
        let records = parse_records(raw.as_deref())?;
        Ok(Snapshot {
            records,
            version: Some(version_of(raw.as_deref())),
        })
    }

    async fn save(
        &self,
        records: &[UploadRecord],
        expected_version: Option<&str>,
    ) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;

        if let Some(expected) = expected_version {
            let current = version_of(self.read_raw().await?.as_deref());
            if current != expected {
                return Err(StoreError::Conflict {
                    expected: expected.to_string(),
                });
            }
        }

        let bytes = serde_json::to_vec_pretty(records)?;
        self.write_atomic(&bytes).await?;

        tracing::debug!(
            path = %self.path.display(),
            records = records.len(),
            size_bytes = bytes.len(),
            "Upload list written"
        );

        Ok(())
    }

    fn backend_type(&self) -> StoreBackend {
        StoreBackend::Local
    }
}
