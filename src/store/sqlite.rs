// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow}, Row};
use std::path::Path;
use crate::store::{
    models::Photo,
    observer::{ChangeNotifier, StoreEvent, Subscription},
    traits::PhotoStore,
};
use tracing::{debug, error, info};

pub struct SqlitePhotoStore {
    pool: SqlitePool,
    notifier: ChangeNotifier,
}

impl SqlitePhotoStore {
    pub async fn new(db_path: &Path) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        let store = Self {
            pool,
            notifier: ChangeNotifier::new(),
        };
        store.init_schema().await?;

        Ok(store)
    }

    async fn init_schema(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS photos (
                id INTEGER PRIMARY KEY,
                title TEXT NOT NULL,
                thumbnail_url TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        info!("Initialized SQLite photo store schema");
        Ok(())
    }

    fn photo_from_row(row: &SqliteRow) -> anyhow::Result<Photo> {
        Ok(Photo {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            thumbnail_url: row.try_get("thumbnail_url")?,
        })
    }
}

#[async_trait]
impl PhotoStore for SqlitePhotoStore {
    async fn upsert_photos(&self, photos: Vec<Photo>) -> anyhow::Result<usize> {
        let mut tx = self.pool.begin().await?;

        for photo in &photos {
            debug!(photo_id = photo.id, title = %photo.title, "Upserting photo");
            sqlx::query(
                r#"
                INSERT INTO photos (id, title, thumbnail_url)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    thumbnail_url = excluded.thumbnail_url
                "#,
            )
            .bind(photo.id)
            .bind(&photo.title)
            .bind(&photo.thumbnail_url)
            .execute(&mut *tx)
            .await?;
        }

        debug!(count = photos.len(), "Saving photos");
        tx.commit().await?;

        // Subscribers must never observe a change before it is durable
        self.notifier.notify(StoreEvent::PhotosChanged { count: photos.len() });

        info!(count = photos.len(), "Upserted photos into store");
        Ok(photos.len())
    }

    async fn list_photos(&self) -> anyhow::Result<Vec<Photo>> {
        let rows = sqlx::query("SELECT id, title, thumbnail_url FROM photos ORDER BY rowid")
            .fetch_all(&self.pool)
            .await?;

        let mut photos = Vec::with_capacity(rows.len());
        for row in rows {
            match Self::photo_from_row(&row) {
                Ok(photo) => photos.push(photo),
                Err(e) => {
                    error!(error = %e, "Failed to parse photo from database");
                }
            }
        }

        Ok(photos)
    }

    async fn get_photo(&self, id: i64) -> anyhow::Result<Option<Photo>> {
        let row = sqlx::query("SELECT id, title, thumbnail_url FROM photos WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(Self::photo_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn count(&self) -> anyhow::Result<usize> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM photos")
            .fetch_one(&self.pool)
            .await?;
        let total: i64 = row.try_get("total")?;

        Ok(usize::try_from(total)?)
    }

    fn subscribe(&self) -> Subscription {
        self.notifier.subscribe()
    }
}
