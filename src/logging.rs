//! Tracing subscriber setup for the operator binary.
//!
//! The library itself only emits `tracing` events; hosts embedding it install
//! their own subscriber.

use std::fs::OpenOptions;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Build the env filter. `RUST_LOG` wins over the configured level.
pub fn build_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("asset_governance={}", config.level))
    })
}

/// Initialize the global subscriber from configuration.
pub fn init_logging(config: &LoggingConfig) -> std::io::Result<()> {
    let subscriber = tracing_subscriber::registry().with(build_filter(config));

    let file = match &config.file {
        Some(path) => Some(OpenOptions::new().create(true).append(true).open(path)?),
        None => None,
    };

    match (config.format.as_str(), file) {
        ("json", Some(file)) => subscriber
            .with(fmt::layer().json().with_writer(file).with_ansi(false))
            .init(),
        ("json", None) => subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        ("compact", Some(file)) => subscriber
            .with(fmt::layer().compact().with_writer(file).with_ansi(false))
            .init(),
        ("compact", None) => subscriber
            .with(
                fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init(),
        (_, Some(file)) => subscriber
            .with(fmt::layer().with_writer(file).with_ansi(false))
            .init(),
        (_, None) => subscriber
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_uses_configured_level() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let config = LoggingConfig {
            level: "debug".to_string(),
            ..Default::default()
        };
        let filter = build_filter(&config);
        assert!(filter.to_string().contains("asset_governance=debug"));
    }
}
