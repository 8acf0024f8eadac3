//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// guildcal - Guild calendar feeds in one list
#[derive(Debug, Parser)]
#[command(name = "guildcal")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "GUILDCAL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    /// Only load the configured feed with this name
    #[arg(long, short, conflicts_with = "url")]
    pub feed: Option<String>,

    /// Load a single feed from this URL instead of the configured ones
    #[arg(long)]
    pub url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List events from the selected feeds (default)
    Events,

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_feed_selection() {
        let cli = Cli::try_parse_from(["guildcal", "--json", "--feed", "Guild 1"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.feed.as_deref(), Some("Guild 1"));
        assert!(cli.command.is_none());
    }

    #[test]
    fn feed_and_url_conflict() {
        let result = Cli::try_parse_from([
            "guildcal",
            "--feed",
            "Guild 1",
            "--url",
            "https://example.com/cal.ics",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn parses_config_subcommand() {
        let cli = Cli::try_parse_from(["guildcal", "config", "validate"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Config {
                action: ConfigAction::Validate
            })
        ));
    }
}
