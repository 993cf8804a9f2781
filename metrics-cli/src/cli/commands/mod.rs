//! Command handlers

pub mod accounts;
pub mod build;
pub mod sync;
pub mod validate;

use crate::config::Config;
use crate::source::excel::TableRef;
use crate::sync::MetricWorkflow;

use super::TableArgs;

pub use accounts::handle_accounts_command;
pub use build::handle_build_table_command;
pub use sync::handle_sync_command;
pub use validate::handle_validate_command;

/// Configured table location with command-line overrides applied
pub(crate) fn resolve_table(config: &Config, args: &TableArgs) -> TableRef {
    let mut table = config.table_ref();
    if let Some(path) = &args.table {
        table.path = path.clone();
    }
    if let Some(sheet) = &args.sheet {
        table.sheet_name = sheet.clone();
    }
    table
}

pub(crate) fn workflow(config: &Config, args: &TableArgs) -> MetricWorkflow {
    MetricWorkflow::new(resolve_table(config, args), config.validation.enum_match)
}
