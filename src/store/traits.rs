// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;
use crate::store::models::Photo;
use crate::store::observer::Subscription;

#[async_trait]
pub trait PhotoStore: Send + Sync {
    /// Insert or overwrite every photo by id inside one transaction.
    /// Returns the number of records written
    async fn upsert_photos(&self, photos: Vec<Photo>) -> anyhow::Result<usize>;

    /// List all photos in store iteration order
    async fn list_photos(&self) -> anyhow::Result<Vec<Photo>>;

    /// Get a photo by ID
    async fn get_photo(&self, id: i64) -> anyhow::Result<Option<Photo>>;

    /// Number of persisted photos
    async fn count(&self) -> anyhow::Result<usize>;

    /// Register for post-commit change events
    fn subscribe(&self) -> Subscription;
}
