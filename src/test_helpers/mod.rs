// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio::sync::oneshot;
use crate::config::Config;
use crate::presenter::ThumbnailLoader;
use crate::remote::{Credentials, PhotoSource, RemoteError};
use crate::store::{ChangeNotifier, Photo, PhotoStore, SqlitePhotoStore, Subscription};
use crate::ui::MainQueue;

/// Create a SQLite store backed by a temporary file.
/// Keep the returned file alive for as long as the store is used
pub async fn setup_test_store() -> (Arc<SqlitePhotoStore>, NamedTempFile) {
    let temp_file = NamedTempFile::new().expect("Failed to create temp database file");
    let store = SqlitePhotoStore::new(temp_file.path())
        .await
        .expect("Failed to open test store");
    (Arc::new(store), temp_file)
}

/// Create a test configuration with temporary paths
pub fn create_test_config() -> Config {
    let temp_dir = std::env::temp_dir().join(format!("booster-test-{}", uuid::Uuid::new_v4()));

    Config {
        api_base_url: "http://localhost:3000/api".to_string(),
        store_db_path: temp_dir.join("test_photos.db"),
        sync_interval_secs: 0,
        request_timeout_secs: 5,
        log_level: "error".to_string(), // Reduce log noise in tests
        log_json: false,
        auth_email: None,
        auth_password: None,
    }
}

/// Wait until every job posted to `queue` so far has run
pub async fn flush(queue: &MainQueue) {
    let (tx, rx) = oneshot::channel();
    assert!(queue.dispatch(move |_| {
        tx.send(()).ok();
    }));
    rx.await.expect("Main loop dropped flush job");
}

/// In-memory photo source with a fixed answer
pub struct ScriptedSource {
    photos: Option<Vec<Photo>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn returning(photos: Vec<Photo>) -> Self {
        Self {
            photos: Some(photos),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Every fetch answers with HTTP 503
    pub fn failing() -> Self {
        Self {
            photos: None,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PhotoSource for ScriptedSource {
    async fn fetch_photos(&self) -> Result<Vec<Photo>, RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.photos.clone().ok_or_else(|| RemoteError::Status {
            status: 503,
            url: "scripted://photos".to_string(),
        })
    }

    async fn authenticate(&self, _credentials: &Credentials) -> Result<(), RemoteError> {
        Ok(())
    }
}

/// Store whose writes always fail
#[derive(Default)]
pub struct FailingStore {
    notifier: ChangeNotifier,
}

#[async_trait]
impl PhotoStore for FailingStore {
    async fn upsert_photos(&self, _photos: Vec<Photo>) -> anyhow::Result<usize> {
        Err(anyhow::anyhow!("disk full"))
    }

    async fn list_photos(&self) -> anyhow::Result<Vec<Photo>> {
        Ok(Vec::new())
    }

    async fn get_photo(&self, _id: i64) -> anyhow::Result<Option<Photo>> {
        Ok(None)
    }

    async fn count(&self) -> anyhow::Result<usize> {
        Ok(0)
    }

    fn subscribe(&self) -> Subscription {
        self.notifier.subscribe()
    }
}

/// Thumbnail loader that fails for a fixed set of URLs
#[derive(Default)]
pub struct StubThumbnailLoader {
    broken: HashSet<String>,
    loads: AtomicUsize,
}

impl StubThumbnailLoader {
    pub fn failing_on(urls: &[&str]) -> Self {
        Self {
            broken: urls.iter().map(|url| url.to_string()).collect(),
            loads: AtomicUsize::new(0),
        }
    }

    /// Number of `load` calls so far, failed ones included
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ThumbnailLoader for StubThumbnailLoader {
    async fn load(&self, url: &str) -> anyhow::Result<Vec<u8>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if self.broken.contains(url) {
            return Err(anyhow::anyhow!("Unresolvable thumbnail {}", url));
        }
        Ok(url.as_bytes().to_vec())
    }
}

/// Thumbnail loader whose requests never complete
pub struct StalledThumbnailLoader;

#[async_trait]
impl ThumbnailLoader for StalledThumbnailLoader {
    async fn load(&self, _url: &str) -> anyhow::Result<Vec<u8>> {
        std::future::pending().await
    }
}

/// Photo source that panics on its first fetch and answers normally after
pub struct PanicOnceSource {
    photos: Vec<Photo>,
    calls: AtomicUsize,
}

impl PanicOnceSource {
    pub fn returning(photos: Vec<Photo>) -> Self {
        Self {
            photos,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PhotoSource for PanicOnceSource {
    async fn fetch_photos(&self) -> Result<Vec<Photo>, RemoteError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            panic!("photo source blew up");
        }
        Ok(self.photos.clone())
    }

    async fn authenticate(&self, _credentials: &Credentials) -> Result<(), RemoteError> {
        Ok(())
    }
}
