//! Logging bootstrap.

use bookshelf_kernel::settings::{LogFormat, TelemetrySettings};
use tracing_subscriber::{fmt, EnvFilter};

/// Filter from `RUST_LOG`, falling back to the configured level.
fn env_filter(settings: &TelemetrySettings) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global tracing subscriber. Returns `false` if one was
/// already installed, which leaves the existing subscriber in place.
pub fn init(settings: &TelemetrySettings) -> bool {
    let builder = fmt().with_env_filter(env_filter(settings)).with_target(true);

    let installed = match settings.log_format {
        LogFormat::Pretty => builder.try_init().is_ok(),
        LogFormat::Json => builder.json().flatten_event(true).try_init().is_ok(),
    };

    if installed {
        tracing::debug!(
            target: "bookshelf-telemetry",
            format = ?settings.log_format,
            level = %settings.log_level,
            "tracing subscriber installed"
        );
    }

    installed
}
