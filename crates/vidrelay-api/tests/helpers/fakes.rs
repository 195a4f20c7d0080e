//! In-process stand-ins for the external publishers.

use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use vidrelay_publish::{FileHost, PublishError, PublishResult, VideoDetails, VideoPlatform};

/// File host that returns `https://gofile.io/d/file{n}` and records what it received.
#[derive(Default)]
pub struct FakeFileHost {
    calls: AtomicUsize,
    received: Mutex<Vec<(String, Vec<u8>)>>,
    fail_with: Option<String>,
}

impl FakeFileHost {
    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `(file_name, bytes)` for each publish call
    pub fn received(&self) -> Vec<(String, Vec<u8>)> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl FileHost for FakeFileHost {
    async fn publish(&self, path: &Path, file_name: &str) -> PublishResult<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let bytes = tokio::fs::read(path).await?;
        self.received
            .lock()
            .unwrap()
            .push((file_name.to_string(), bytes));

        match &self.fail_with {
            Some(message) => Err(PublishError::UploadRejected(message.clone())),
            None => Ok(format!("https://gofile.io/d/file{}", n)),
        }
    }
}

/// Video platform that either succeeds with a watch URL or has no credential.
pub struct FakeVideoPlatform {
    authorized: bool,
    calls: AtomicUsize,
    details: Mutex<Vec<VideoDetails>>,
}

impl FakeVideoPlatform {
    pub fn authorized() -> Self {
        Self {
            authorized: true,
            calls: AtomicUsize::new(0),
            details: Mutex::new(Vec::new()),
        }
    }

    pub fn unauthorized() -> Self {
        Self {
            authorized: false,
            ..Self::authorized()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn details(&self) -> Vec<VideoDetails> {
        self.details.lock().unwrap().clone()
    }
}

#[async_trait]
impl VideoPlatform for FakeVideoPlatform {
    async fn publish(&self, path: &Path, details: &VideoDetails) -> PublishResult<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.authorized {
            return Err(PublishError::AuthenticationRequired(
                "no refresh-capable credential configured".to_string(),
            ));
        }
        assert!(path.exists(), "temporary file must exist while publishing");
        self.details.lock().unwrap().push(details.clone());
        Ok(format!("https://www.youtube.com/watch?v=vid{}", n))
    }
}
