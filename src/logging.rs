//! Logging setup
//!
//! Installs the global `tracing` subscriber. `RUST_LOG` overrides the level
//! derived from the configuration.

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::SessionConfig;

/// Default filter directive for a configuration
pub fn default_filter(config: &SessionConfig) -> &'static str {
    if config.debug {
        "info,bedrock_session=debug"
    } else {
        "info"
    }
}

/// Initialize the global subscriber, as plain text or JSON
pub fn init_logging(config: &SessionConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(config)));

    if config.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true))
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_line_number(true),
            )
            .try_init()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        let mut config = SessionConfig::default();
        assert_eq!(default_filter(&config), "info");

        config.debug = true;
        assert_eq!(default_filter(&config), "info,bedrock_session=debug");
    }

    #[test]
    fn test_second_init_fails() {
        let config = SessionConfig::default();
        // The first call may race with nothing else; the second always finds
        // a subscriber installed
        let _ = init_logging(&config);
        assert!(init_logging(&config).is_err());
    }
}
