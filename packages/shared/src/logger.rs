//! Logging setup utilities for the Seminar binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified default log level.
///
/// The caller passes its own crate name (normally `env!("CARGO_PKG_NAME")`)
/// so the default filter targets the right module tree. The log level can be
/// overridden using the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `crate_name` - The name of the calling crate (e.g., "seminar-server")
/// * `default_level` - The default log level (e.g., "debug", "info", "warn", "error")
pub fn setup_logger(crate_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "{}={}",
                    crate_name.replace("-", "_"),
                    default_log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::debug!(
        "Logger initialized for {} (default level: {})",
        crate_name,
        default_log_level
    );
}
