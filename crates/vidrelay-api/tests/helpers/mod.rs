//! Test helpers: build AppState and router for integration tests.
//!
//! Publishers are replaced with in-process fakes; the store is a real
//! `LocalJsonStore` in a temporary directory.

#![allow(dead_code)]

pub mod fakes;
pub mod fixtures;

use axum_test::TestServer;
use fakes::{FakeFileHost, FakeVideoPlatform};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use vidrelay_api::setup::routes;
use vidrelay_api::setup::services::seed_id_generator;
use vidrelay_api::{AppState, UploadService, UploadSettings};
use vidrelay_core::Config;
use vidrelay_store::{LocalJsonStore, MetadataStore};

pub const CONTACT_URL: &str = "https://lin.ee/test-contact";

/// Test application: server, fakes and owned directories.
pub struct TestApp {
    pub server: TestServer,
    pub file_host: Arc<FakeFileHost>,
    pub video_platform: Arc<FakeVideoPlatform>,
    pub store_path: PathBuf,
    pub upload_dir: TempDir,
    pub _data_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Files left behind in the upload buffer directory
    pub fn leftover_uploads(&self) -> usize {
        std::fs::read_dir(self.upload_dir.path())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    /// Raw contents of the list file, `None` when it was never written
    pub fn stored_json(&self) -> Option<String> {
        std::fs::read_to_string(&self.store_path).ok()
    }
}

pub struct TestAppBuilder {
    file_host: FakeFileHost,
    video_platform: FakeVideoPlatform,
    store_path: Option<PathBuf>,
}

impl TestAppBuilder {
    pub fn new() -> Self {
        Self {
            file_host: FakeFileHost::default(),
            video_platform: FakeVideoPlatform::authorized(),
            store_path: None,
        }
    }

    pub fn file_host(mut self, file_host: FakeFileHost) -> Self {
        self.file_host = file_host;
        self
    }

    pub fn video_platform(mut self, video_platform: FakeVideoPlatform) -> Self {
        self.video_platform = video_platform;
        self
    }

    /// Put the list at a path of the caller's choosing (e.g. one that cannot be read)
    pub fn store_path(mut self, path: &Path) -> Self {
        self.store_path = Some(path.to_path_buf());
        self
    }

    pub async fn build(self) -> TestApp {
        let data_dir = tempfile::tempdir().expect("Failed to create data directory");
        let upload_dir = tempfile::tempdir().expect("Failed to create upload directory");
        let store_path = self
            .store_path
            .unwrap_or_else(|| data_dir.path().join("videos.json"));

        let upload_dir_value = upload_dir.path().display().to_string();
        let store_path_value = store_path.display().to_string();
        let config = Config::from_lookup(|key| match key {
            "TEMP_DIR" => Some(upload_dir_value.clone()),
            "VIDEOS_JSON_PATH" => Some(store_path_value.clone()),
            "CONTACT_URL" => Some(CONTACT_URL.to_string()),
            _ => None,
        })
        .expect("Failed to build test config");

        let store: Arc<dyn MetadataStore> = Arc::new(LocalJsonStore::new(&store_path));
        let file_host = Arc::new(self.file_host);
        let video_platform = Arc::new(self.video_platform);

        let uploads = UploadService::new(
            file_host.clone(),
            video_platform.clone(),
            store.clone(),
            seed_id_generator(store.as_ref()).await,
            UploadSettings::from_config(&config),
        );
        let state = Arc::new(AppState::new(config.clone(), uploads, store));
        let router = routes::setup_routes(&config, state).expect("Failed to build router");

        TestApp {
            server: TestServer::new(router.into_make_service()).expect("Failed to start test server"),
            file_host,
            video_platform,
            store_path,
            upload_dir,
            _data_dir: data_dir,
        }
    }
}

/// Setup test app with working fakes and an empty list.
pub async fn setup_test_app() -> TestApp {
    TestAppBuilder::new().build().await
}
