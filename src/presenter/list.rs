// SPDX-License-Identifier: GPL-3.0-only
use futures_util::stream::{self, StreamExt};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};
use crate::presenter::thumbnail::ThumbnailLoader;
use crate::store::{models::Photo, traits::PhotoStore};

/// Accessibility label of the photo list
pub const LIST_ACCESSIBILITY_LABEL: &str = "Photos List";

/// Upper bound on thumbnail requests in flight for one render
const MAX_CONCURRENT_THUMBNAILS: usize = 8;

#[derive(thiserror::Error, Debug)]
pub enum PresenterError {
    #[error("Row index {index} out of bounds (count {count})")]
    IndexOutOfBounds { index: usize, count: usize },

    #[error("Failed to read photos from store: {0}")]
    Store(String),
}

/// One rendered list row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoRow {
    pub photo_id: i64,
    pub title: String,
    /// `None` while loading or when the thumbnail could not be resolved
    pub thumbnail: Option<Arc<[u8]>>,
}

/// Read-through view over every persisted photo.
///
/// Owned by the main loop; `refresh` and `apply_render` only ever run there.
/// Thumbnail loading is split out into a [`RenderBatch`] so the network work
/// can run elsewhere.
pub struct ListPresenter {
    store: Arc<dyn PhotoStore>,
    loader: Arc<dyn ThumbnailLoader>,
    photos: Vec<Photo>,
    rows: Vec<PhotoRow>,
    selected_id: Option<i64>,
    /// Thumbnail bytes by URL, limited to URLs of the current snapshot
    thumbnails: HashMap<String, Arc<[u8]>>,
    /// Bumped on every refresh; renders of an older snapshot are discarded
    generation: u64,
}

impl ListPresenter {
    pub fn new(store: Arc<dyn PhotoStore>, loader: Arc<dyn ThumbnailLoader>) -> Self {
        Self {
            store,
            loader,
            photos: Vec::new(),
            rows: Vec::new(),
            selected_id: None,
            thumbnails: HashMap::new(),
            generation: 0,
        }
    }

    pub fn count(&self) -> usize {
        self.photos.len()
    }

    pub fn record_at(&self, index: usize) -> Result<&Photo, PresenterError> {
        self.photos.get(index).ok_or(PresenterError::IndexOutOfBounds {
            index,
            count: self.photos.len(),
        })
    }

    /// Remember the row handed to the detail view
    pub fn select_record(&mut self, index: usize) -> Result<(), PresenterError> {
        let id = self.record_at(index)?.id;
        self.selected_id = Some(id);
        debug!(index, photo_id = id, "Selected photo");
        Ok(())
    }

    /// The selected photo as of the latest snapshot.
    ///
    /// The selection follows the photo id, not the row, so a refresh that moves
    /// rows keeps the same photo selected.
    pub fn selected_record(&self) -> Option<&Photo> {
        let id = self.selected_id?;
        self.photos.iter().find(|photo| photo.id == id)
    }

    /// Most recently rendered rows
    pub fn rows(&self) -> &[PhotoRow] {
        &self.rows
    }

    /// Re-read the full record set from the store.
    ///
    /// Rows are rebuilt right away from already loaded thumbnails; rows whose
    /// thumbnail is not loaded yet stay blank until the next render lands.
    pub async fn refresh(&mut self) -> Result<(), PresenterError> {
        let photos = self
            .store
            .list_photos()
            .await
            .map_err(|e| PresenterError::Store(e.to_string()))?;

        debug!(count = photos.len(), "Refreshed photo list");
        self.generation += 1;
        self.rows = project_rows(&photos, &self.thumbnails);
        self.photos = photos;
        Ok(())
    }

    /// Snapshot what a render of the current records needs
    pub fn render_batch(&self) -> RenderBatch {
        RenderBatch {
            generation: self.generation,
            photos: self.photos.clone(),
            cached: self.thumbnails.clone(),
            loader: Arc::clone(&self.loader),
        }
    }

    /// Install rows produced by [`RenderBatch::load`].
    ///
    /// Returns `false` and changes nothing if a refresh happened since the
    /// batch was taken.
    pub fn apply_render(&mut self, rendered: RenderedRows) -> bool {
        if rendered.generation != self.generation {
            debug!(
                batch = rendered.generation,
                current = self.generation,
                "Discarding stale render"
            );
            return false;
        }

        self.rows = rendered.rows;
        self.thumbnails = rendered.thumbnails;
        true
    }

    /// Load thumbnails in place and return the rows. A thumbnail failure only
    /// blanks its own row.
    pub async fn render(&mut self) -> &[PhotoRow] {
        let rendered = self.render_batch().load().await;
        self.apply_render(rendered);
        &self.rows
    }
}

/// Thumbnail work for one snapshot, detached from the presenter
pub struct RenderBatch {
    generation: u64,
    photos: Vec<Photo>,
    cached: HashMap<String, Arc<[u8]>>,
    loader: Arc<dyn ThumbnailLoader>,
}

/// Output of a [`RenderBatch`], handed back to the presenter
pub struct RenderedRows {
    generation: u64,
    rows: Vec<PhotoRow>,
    thumbnails: HashMap<String, Arc<[u8]>>,
}

impl RenderBatch {
    /// Fetch every thumbnail not already cached, a bounded number at a time.
    /// Each URL is requested at most once per batch.
    pub async fn load(self) -> RenderedRows {
        let RenderBatch {
            generation,
            photos,
            mut cached,
            loader,
        } = self;

        let current: HashSet<&str> = photos.iter().map(|photo| photo.thumbnail_url.as_str()).collect();
        cached.retain(|url, _| current.contains(url.as_str()));

        let missing: Vec<String> = current
            .iter()
            .filter(|url| !cached.contains_key(**url))
            .map(|url| url.to_string())
            .collect();
        debug!(cached = cached.len(), missing = missing.len(), "Loading thumbnails");

        let loaded: Vec<(String, anyhow::Result<Vec<u8>>)> = stream::iter(missing)
            .map(|url| {
                let loader = Arc::clone(&loader);
                async move {
                    let result = loader.load(&url).await;
                    (url, result)
                }
            })
            .buffer_unordered(MAX_CONCURRENT_THUMBNAILS)
            .collect()
            .await;

        for (url, result) in loaded {
            match result {
                Ok(bytes) => {
                    cached.insert(url, Arc::from(bytes));
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "Invalid thumbnail");
                }
            }
        }

        RenderedRows {
            generation,
            rows: project_rows(&photos, &cached),
            thumbnails: cached,
        }
    }
}

fn project_rows(photos: &[Photo], thumbnails: &HashMap<String, Arc<[u8]>>) -> Vec<PhotoRow> {
    photos
        .iter()
        .map(|photo| PhotoRow {
            photo_id: photo.id,
            title: photo.title.clone(),
            thumbnail: thumbnails.get(&photo.thumbnail_url).cloned(),
        })
        .collect()
}
