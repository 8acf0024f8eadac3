//! guildcal CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use guildcal_core::{TracingConfig, init_tracing};

use guildcal_client::cli::{Cli, Command, ConfigAction};
use guildcal_client::commands;
use guildcal_client::config::ClientConfig;
use guildcal_client::error::{ClientError, ClientResult};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    let tracing = if cli.debug {
        TracingConfig::cli_debug()
    } else {
        TracingConfig::cli()
    };
    if let Err(e) = init_tracing(tracing) {
        eprintln!("warning: {}", e);
    }

    // Run the command
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    // Load configuration
    let path = cli.config.clone().unwrap_or_else(ClientConfig::default_path);
    let config = if cli.config.is_some() {
        ClientConfig::load_from(&path).map_err(ClientError::Config)?
    } else {
        ClientConfig::load().map_err(ClientError::Config)?
    };

    // Handle subcommands
    match cli.command {
        Some(Command::Config { action }) => match action {
            ConfigAction::Dump => commands::config::dump(&config, &path),
            ConfigAction::Validate => commands::config::validate(&config),
            ConfigAction::Path => commands::config::path(&path),
        },
        Some(Command::Events) | None => {
            commands::events::run(
                &config,
                &path,
                cli.feed.as_deref(),
                cli.url.as_deref(),
                cli.json,
            )
            .await
        }
    }
}
