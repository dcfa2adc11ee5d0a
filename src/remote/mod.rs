// SPDX-License-Identifier: GPL-3.0-only
pub mod auth;
pub mod client;
pub mod traits;

pub use auth::authenticate_then;
pub use client::ApiClient;
pub use traits::{Credentials, PhotoSource, RemoteError};
