// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use crate::store::models::Photo;

#[derive(thiserror::Error, Debug)]
pub enum RemoteError {
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

impl Credentials {
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        password_confirmation: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            password_confirmation: password_confirmation.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .field("password_confirmation", &"***")
            .finish()
    }
}

#[async_trait]
pub trait PhotoSource: Send + Sync {
    /// Fetch every photo from the remote API, in response order
    async fn fetch_photos(&self) -> Result<Vec<Photo>, RemoteError>;

    /// Sign in with the given credentials
    async fn authenticate(&self, credentials: &Credentials) -> Result<(), RemoteError>;
}
