//! Heartrisk - Main Entry Point
//!
//! Subcommands for one-shot runs; no subcommand starts the interactive menu.

use clap::Parser;
use heartrisk::cli::{cmd_info, cmd_interactive, cmd_predict, cmd_preprocess, cmd_train, load_config, Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "heartrisk=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Some(Commands::Info { data }) => {
            cmd_info(&config, &data)?;
        }
        Some(Commands::Preprocess { data, output }) => {
            cmd_preprocess(&config, &data, output.as_deref())?;
        }
        Some(Commands::Train { data, n_estimators, test_fraction, json }) => {
            cmd_train(&config, &data, n_estimators, test_fraction, json)?;
        }
        Some(Commands::Predict { data, values }) => {
            cmd_predict(&config, &data, &values)?;
        }
        None => {
            cmd_interactive(&config)?;
        }
    }

    Ok(())
}
