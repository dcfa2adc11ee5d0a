// SPDX-License-Identifier: GPL-3.0-only
use tokio::signal;
use tracing::{error, info};

use booster_kit::app::App;
use booster_kit::config::Config;
use booster_kit::logging::setup_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    setup_logging(&config.log_level, config.log_json)?;

    info!("Starting booster-kit v{}", env!("CARGO_PKG_VERSION"));

    let app = App::start(&config).await?;
    app.initial_sync(&config);

    if let Some(period) = config.sync_interval() {
        app.spawn_periodic_sync(period);
    }

    info!("All services started. Waiting for shutdown signal...");

    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Received shutdown signal (Ctrl+C)");
        }
        Err(err) => {
            error!(error = %err, "Unable to listen for shutdown signal");
        }
    }

    info!("Initiating graceful shutdown...");
    app.shutdown().await;

    info!("Shutdown complete");
    Ok(())
}
