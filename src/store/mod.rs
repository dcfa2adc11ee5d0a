// SPDX-License-Identifier: GPL-3.0-only
pub mod models;
pub mod observer;
pub mod traits;
pub mod sqlite;

pub use models::Photo;
pub use observer::{ChangeNotifier, StoreEvent, Subscription};
pub use traits::PhotoStore;
pub use sqlite::SqlitePhotoStore;
