//! metrics-cli: keep Google Analytics custom metric definitions in sync with a spreadsheet

mod api;
mod cli;
mod config;
mod error;
mod source;
mod sync;

use anyhow::Result;
use clap::Parser;
use colored::*;

use cli::{Cli, Commands};
use config::Config;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    if cli.no_color {
        colored::control::set_override(false);
    }

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::BuildTable(args) => cli::commands::handle_build_table_command(&config, args),
        Commands::Validate(args) => cli::commands::handle_validate_command(&config, args),
        Commands::Accounts => cli::commands::handle_accounts_command(&config).await,
        Commands::Sync(args) => cli::commands::handle_sync_command(&config, args).await,
    }
}
