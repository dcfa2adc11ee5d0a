// SPDX-License-Identifier: GPL-3.0-only
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, warn};
use crate::remote::traits::{Credentials, PhotoSource};
use crate::ui::MainQueue;

/// Sign in on a background task and run `on_success` on the main context.
///
/// `on_success` runs exactly once when the server accepts the credentials and
/// never on failure; failures are logged.
pub fn authenticate_then<F>(
    source: Arc<dyn PhotoSource>,
    credentials: Credentials,
    main: MainQueue,
    on_success: F,
) -> JoinHandle<()>
where
    F: FnOnce() + Send + 'static,
{
    tokio::spawn(async move {
        match source.authenticate(&credentials).await {
            Ok(()) => {
                if !main.dispatch(move |_| on_success()) {
                    warn!("Main loop stopped before sign-in completion could run");
                }
            }
            Err(e) => {
                error!(error = %e, email = %credentials.email, "Failed to authenticate");
            }
        }
    })
}
