//! Tracing bootstrap shared by the server binary and the CLI.

use anyhow::Context;
use passin_kernel::settings::{LogFormat, TelemetrySettings};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the filter: `RUST_LOG` wins over the configured directives.
pub fn env_filter(settings: &TelemetrySettings) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.filter))
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let registry = tracing_subscriber::registry().with(env_filter(settings));

    match settings.log_format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .context("failed to install pretty tracing subscriber")?,
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().flatten_event(true))
            .try_init()
            .context("failed to install json tracing subscriber")?,
    }

    tracing::debug!(
        target: "passin-telemetry",
        format = ?settings.log_format,
        "tracing initialized"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_filter_is_used_without_rust_log() {
        let settings = TelemetrySettings {
            log_format: LogFormat::Pretty,
            filter: "warn".to_string(),
        };
        if std::env::var("RUST_LOG").is_err() {
            assert_eq!(env_filter(&settings).to_string(), "warn");
        }
    }
}
