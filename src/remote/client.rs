// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{error, info, warn};
use url::Url;
use crate::remote::traits::{Credentials, PhotoSource, RemoteError};
use crate::store::models::Photo;

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RemoteError> {
        let parsed = Url::parse(base_url)
            .map_err(|e| RemoteError::InvalidBaseUrl(format!("{}: {}", base_url, e)))?;

        match parsed.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(RemoteError::InvalidBaseUrl(format!(
                    "unsupported scheme {} (only http and https are allowed)",
                    scheme
                )));
            }
        }
        if parsed.host_str().is_none() {
            return Err(RemoteError::InvalidBaseUrl(format!("{} has no host", base_url)));
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("booster-kit/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[async_trait]
impl PhotoSource for ApiClient {
    async fn fetch_photos(&self) -> Result<Vec<Photo>, RemoteError> {
        let url = self.endpoint("photos");
        info!(url = %url, "Fetching photos");

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            warn!(status = %status, url = %url, "Failed to fetch photos");
            return Err(RemoteError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.bytes().await?;
        let photos: Vec<Photo> = serde_json::from_slice(&body)
            .map_err(|source| RemoteError::Decode { url: url.clone(), source })?;

        info!(count = photos.len(), "Fetched photos");
        Ok(photos)
    }

    async fn authenticate(&self, credentials: &Credentials) -> Result<(), RemoteError> {
        let url = self.endpoint("auth/sign_in");
        info!(email = %credentials.email, "Signing in");

        let response = self.client.post(&url).json(credentials).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            error!(status = %status, email = %credentials.email, "Sign in failed");
            return Err(RemoteError::Status {
                status: status.as_u16(),
                url,
            });
        }

        info!(email = %credentials.email, "Signed in");
        Ok(())
    }
}
