//! Application state shared by all handlers.

use crate::services::upload::UploadService;
use std::path::PathBuf;
use std::sync::Arc;
use vidrelay_core::Config;
use vidrelay_store::MetadataStore;

pub struct AppState {
    pub config: Config,
    pub uploads: UploadService,
    pub store: Arc<dyn MetadataStore>,
    /// Where request-scoped upload buffers are created
    pub temp_dir: PathBuf,
}

impl AppState {
    pub fn new(config: Config, uploads: UploadService, store: Arc<dyn MetadataStore>) -> Self {
        let temp_dir = config.temp_dir();
        Self {
            config,
            uploads,
            store,
            temp_dir,
        }
    }
}
