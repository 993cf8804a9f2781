//! Command-line surface

pub mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "metrics-cli",
    about = "Manage Google Analytics custom metrics from a spreadsheet",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Path to config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build or reformat the source table workbook
    BuildTable(BuildTableArgs),

    /// Check the source table without touching the remote account
    Validate(TableArgs),

    /// List accounts and properties the token can manage
    Accounts,

    /// Create or update the custom metrics of a property to match the source table
    Sync(SyncCommands),
}

/// Override the configured table location
#[derive(Args, Debug, Clone, Default)]
pub struct TableArgs {
    /// Workbook path
    #[arg(long)]
    pub table: Option<PathBuf>,

    /// Sheet holding the table
    #[arg(long)]
    pub sheet: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct BuildTableArgs {
    #[command(flatten)]
    pub table: TableArgs,

    /// Discard the workbook's other sheets instead of refusing to rebuild
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SyncCommands {
    #[command(flatten)]
    pub table: TableArgs,

    /// Account ID (prompted for when omitted)
    #[arg(long)]
    pub account: Option<String>,

    /// Web property ID, e.g. UA-12345-1 (prompted for when omitted)
    #[arg(long)]
    pub property: Option<String>,

    /// Only process slots 1..=LIMIT (1-200)
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..=200))]
    pub limit: Option<u16>,

    /// Show the create/update plan without calling the API
    #[arg(long)]
    pub dry_run: bool,

    /// Stop at the first failed slot
    #[arg(long)]
    pub fail_fast: bool,

    /// Export the run report to this Excel file
    #[arg(long)]
    pub report: Option<PathBuf>,
}
