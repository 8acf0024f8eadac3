//! Tracing setup for guildcal
//!
//! Library crates only emit events through `tracing`; the `guildcal` binary
//! picks one of two presets and installs it once at startup. Output is a
//! compact, timestamp-free format on stderr, so it never interleaves with
//! the event listing or JSON written to stdout.
//!
//! # Usage
//!
//! ```ignore
//! use guildcal_core::{init_tracing, TracingConfig};
//!
//! let config = if debug { TracingConfig::cli_debug() } else { TracingConfig::cli() };
//! init_tracing(config)?;
//! ```

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Errors that can occur during tracing initialization
#[derive(Debug, Error)]
pub enum TracingError {
    /// Failed to set global subscriber
    #[error("failed to set global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    /// Failed to parse env filter directive
    #[error("failed to parse env filter: {0}")]
    EnvFilter(#[from] tracing_subscriber::filter::ParseError),
}

/// Logging preset for the CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Level for the `guildcal` crates when `RUST_LOG` is unset.
    pub default_level: Level,
    /// Show source file and line.
    pub include_location: bool,
    /// Show the module path of each event.
    pub include_target: bool,
    /// Explicit filter directive, used instead of `RUST_LOG` and the level.
    pub env_filter: Option<String>,
}

impl TracingConfig {
    /// Warnings and errors only: rejected login pages, failed fetches.
    #[must_use]
    pub fn cli() -> Self {
        Self {
            default_level: Level::WARN,
            include_location: false,
            include_target: false,
            env_filter: None,
        }
    }

    /// Everything down to `debug!`, with targets and source locations.
    #[must_use]
    pub fn cli_debug() -> Self {
        Self {
            default_level: Level::DEBUG,
            include_location: true,
            include_target: true,
            env_filter: None,
        }
    }

    /// Replaces `RUST_LOG` and the default level with an explicit directive.
    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    fn filter(&self) -> Result<EnvFilter, TracingError> {
        match self.env_filter {
            Some(ref directive) => Ok(EnvFilter::try_new(directive)?),
            None => Ok(EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_directive(self.default_level)))),
        }
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self::cli()
    }
}

/// Installs the global subscriber described by `config`.
///
/// # Errors
///
/// Returns an error if a global subscriber is already set or the explicit
/// filter directive does not parse.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let filter = config.filter()?;

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .compact()
        .without_time()
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_target(config.include_target);

    let subscriber = tracing_subscriber::registry().with(filter).with(layer);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Builds the filter directive used when `RUST_LOG` is unset.
///
/// The `guildcal` target prefix covers every workspace crate.
fn default_directive(level: Level) -> String {
    format!("guildcal={}", level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_preset_is_quiet() {
        let config = TracingConfig::cli();
        assert_eq!(config.default_level, Level::WARN);
        assert!(!config.include_target);
        assert!(!config.include_location);
        assert_eq!(TracingConfig::default(), config);
    }

    #[test]
    fn debug_preset_shows_locations() {
        let config = TracingConfig::cli_debug();
        assert_eq!(config.default_level, Level::DEBUG);
        assert!(config.include_location);
        assert!(config.include_target);
    }

    #[test]
    fn directive_targets_workspace() {
        assert_eq!(default_directive(Level::DEBUG), "guildcal=DEBUG");
    }

    #[test]
    fn explicit_filter_wins() {
        let config = TracingConfig::cli().with_env_filter("guildcal_feed=trace");
        assert_eq!(config.env_filter.as_deref(), Some("guildcal_feed=trace"));
        assert!(config.filter().is_ok());
    }

    #[test]
    fn invalid_filter_is_rejected() {
        let config = TracingConfig::cli().with_env_filter("guildcal=loudest");
        assert!(matches!(
            init_tracing(config),
            Err(TracingError::EnvFilter(_))
        ));
    }
}
