// SPDX-FileCopyrightText: 2026 Suptrack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Suptrack - WhatsApp customer-support and supplier follow-up bot.
//!
//! This is the binary entry point.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use suptrack_config::SuptrackConfig;

mod pending;
mod serve;
mod tickets;

/// Suptrack - WhatsApp customer-support and supplier follow-up bot.
#[derive(Parser, Debug)]
#[command(name = "suptrack", version, about, long_about = None)]
struct Cli {
    /// Path to a TOML config file (defaults to the XDG hierarchy).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the webhook server and background sweeps.
    Serve,
    /// Search CRM tickets from the command line.
    SearchTickets(tickets::SearchArgs),
    /// Execute due reschedules once and exit.
    RunPending,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("suptrack: configuration error: {e}");
            std::process::exit(1);
        }
    };

    init_tracing(&config.bot.log_level);

    let result = match cli.command {
        Commands::Serve => serve::run(config).await,
        Commands::SearchTickets(args) => tickets::run(config, args).await,
        Commands::RunPending => pending::run(config).await,
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "command failed");
        eprintln!("suptrack: {e}");
        std::process::exit(1);
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<SuptrackConfig, figment::Error> {
    match path {
        Some(path) => suptrack_config::load_config_from_path(path),
        None => suptrack_config::load_config(),
    }
}

/// Initializes the tracing subscriber with the configured log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("suptrack={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn search_tickets_parses_filters() {
        let cli = Cli::parse_from(["suptrack", "search-tickets", "--case", "12345"]);
        match cli.command {
            Commands::SearchTickets(args) => assert_eq!(args.case.as_deref(), Some("12345")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = suptrack_config::load_config_from_str("").unwrap();
        assert_eq!(config.bot.log_level, "info");
    }
}
