//! Tracing subscriber bootstrap.
//!
//! `RUST_LOG` takes precedence over `telemetry.log_level` from settings.

use anyhow::anyhow;
use tracing_subscriber::EnvFilter;

use bookstore_kernel::settings::{LogFormat, TelemetrySettings};

/// Install the global tracing subscriber described by `settings`.
///
/// Fails if a global subscriber has already been set.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let filter = build_filter(&settings.log_level);

    let result = match settings.log_format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .flatten_event(true)
            .try_init(),
    };
    result.map_err(|err| anyhow!(err))?;

    tracing::info!(
        target: "bookstore-telemetry",
        format = ?settings.log_format,
        "telemetry initialized"
    );
    Ok(())
}

fn build_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_fails() {
        let settings = TelemetrySettings::default();
        let first = init(&settings);
        let second = init(&settings);
        assert!(first.is_ok());
        assert!(second.is_err());
    }
}
