// SPDX-License-Identifier: GPL-3.0-only
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    /// Primary key, stable across syncs
    pub id: i64,

    /// Display title
    pub title: String,

    /// Remote thumbnail image URL
    pub thumbnail_url: String,
}

impl Photo {
    pub fn new(id: i64, title: impl Into<String>, thumbnail_url: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            thumbnail_url: thumbnail_url.into(),
        }
    }
}
