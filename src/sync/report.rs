// SPDX-License-Identifier: GPL-3.0-only
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    /// Identifier of the sync cycle, shared by every joined caller
    pub sync_id: Uuid,

    /// Number of photos fetched and written
    pub fetched: usize,

    pub finished_at: DateTime<Utc>,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("Failed to fetch photos: {0}")]
    Fetch(String),

    #[error("Failed saving photos: {0}")]
    Commit(String),

    #[error("Sync task aborted: {0}")]
    Aborted(String),
}

/// Completion value of one sync cycle
pub type SyncResult = Result<SyncReport, SyncError>;
