// SPDX-License-Identifier: GPL-3.0-only
pub mod list;
pub mod thumbnail;

pub use list::{ListPresenter, PhotoRow, PresenterError, RenderBatch, RenderedRows, LIST_ACCESSIBILITY_LABEL};
pub use thumbnail::{HttpThumbnailLoader, ThumbnailLoader};
