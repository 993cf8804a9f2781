//! `validate` command handler

use anyhow::Result;
use colored::*;

use super::workflow;
use crate::cli::TableArgs;
use crate::config::Config;

pub fn handle_validate_command(config: &Config, args: TableArgs) -> Result<()> {
    let flow = workflow(config, &args);
    flow.validate()?;

    let desired = flow.load_desired()?;
    let explicit = desired.iter().filter(|s| !s.is_default_derived()).count();
    println!(
        "{} {} ({} explicit slots, {} from DEFAULT/EMPTY, {} matching)",
        "Valid:".green().bold(),
        flow.table().path.display(),
        explicit,
        desired.len() - explicit,
        config.validation.enum_match.label()
    );
    Ok(())
}
