// SPDX-License-Identifier: GPL-3.0-only
pub mod coordinator;
pub mod report;

pub use coordinator::SyncCoordinator;
pub use report::{SyncError, SyncReport, SyncResult};
