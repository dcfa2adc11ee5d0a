// SPDX-License-Identifier: GPL-3.0-only
use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

#[async_trait]
pub trait ThumbnailLoader: Send + Sync {
    /// Resolve a thumbnail reference to image bytes
    async fn load(&self, url: &str) -> anyhow::Result<Vec<u8>>;
}

pub struct HttpThumbnailLoader {
    client: Client,
}

impl HttpThumbnailLoader {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("booster-kit/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ThumbnailLoader for HttpThumbnailLoader {
    async fn load(&self, url: &str) -> anyhow::Result<Vec<u8>> {
        let url = Url::parse(url).context("Invalid thumbnail URL")?;

        let response = self.client.get(url.clone()).send().await?;
        response.error_for_status_ref()?;

        let content = response.bytes().await?;
        if content.is_empty() {
            return Err(anyhow::anyhow!("Empty thumbnail body from {}", url));
        }

        Ok(content.to_vec())
    }
}
