// SPDX-License-Identifier: GPL-3.0-only
use tracing_subscriber::{fmt, EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Build the level filter: `RUST_LOG` wins over the configured level,
/// and an unparseable level falls back to "info".
fn build_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize tracing subscriber with configuration
pub fn setup_logging(log_level: &str, json: bool) -> anyhow::Result<()> {
    let registry = tracing_subscriber::registry().with(build_filter(log_level));

    if json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true)
            )
            .try_init()?;
    } else {
        registry
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
            )
            .try_init()?;
    }

    Ok(())
}
