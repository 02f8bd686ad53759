use anyhow::Result;
use clap::Parser;

use plot_contract::cli::commands::{
    show_how_to_get_started, CheckCommand, Command, ExtractCommand, SessionCommand, ShowConfigCommand,
};
use plot_contract::cli::{Cli, Commands};
use plot_contract::{config, init_config, init_telemetry};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = config()?.clone();
    if let Some(base_url) = cli.base_url {
        config.api.base_url = base_url;
    }
    if cli.json_logs {
        config.observability.json_logs = true;
    }
    if cli.verbose {
        config.observability.log_level = "debug".to_string();
    }
    init_telemetry(&config.observability)?;
    init_config()?;

    match cli.command {
        // No subcommand: explain how to get started
        None => show_how_to_get_started(),
        Some(Commands::Extract { file }) => tokio::runtime::Runtime::new()?.block_on(async {
            ExtractCommand::new(file, config).execute().await
        }),
        Some(Commands::Check { file, relationship }) => tokio::runtime::Runtime::new()?.block_on(async {
            CheckCommand::new(file, relationship, config).execute().await
        }),
        Some(Commands::Session { file }) => tokio::runtime::Runtime::new()?.block_on(async {
            SessionCommand::new(file, config).execute().await
        }),
        Some(Commands::Config { write }) => tokio::runtime::Runtime::new()?.block_on(async {
            ShowConfigCommand::new(config, write).execute().await
        }),
    }
}
