//! `build-table` command handler

use anyhow::Result;
use colored::*;

use super::workflow;
use crate::cli::BuildTableArgs;
use crate::config::Config;

pub fn handle_build_table_command(config: &Config, args: BuildTableArgs) -> Result<()> {
    let flow = workflow(config, &args.table);
    let outcome = flow.build_table(args.force)?;
    let table = flow.table();

    let verb = if outcome.reformatted { "Reformatted" } else { "Created" };
    println!(
        "{} sheet '{}' in {}",
        verb,
        table.sheet_name.bright_green(),
        table.path.display().to_string().cyan()
    );
    if outcome.filled_default {
        println!("DEFAULT/EMPTY row filled with (n/a), HIT, INTEGER, false");
    }
    println!("{} of 200 slots populated", outcome.populated_slots);
    if !outcome.dropped_sheets.is_empty() {
        println!(
            "{} discarded other sheets: {}",
            "Warning:".yellow().bold(),
            outcome.dropped_sheets.join(", ")
        );
    }
    Ok(())
}
