//! Error taxonomy for table validation and reconciliation runs

use std::fmt;
use std::path::PathBuf;

use crate::source::slot::{DEFAULT_ROW_LABEL, MAX_SLOTS, slot_index_to_id};
use crate::sync::SlotAction;

/// Errors raised while validating the source table or reconciling slots.
///
/// Everything except `RemoteCallFailure` is fatal and aborts a run before any
/// remote call is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricsError {
    /// The DEFAULT/EMPTY row is not a valid row
    InvalidDefaultRow,
    /// A slot row is partially filled or carries an unknown enumeration value
    InvalidRow(usize),
    /// The workbook or its sheet does not exist yet
    MissingTable { path: PathBuf, sheet: String },
    /// Rebuilding the workbook would discard sheets other than the table sheet
    ForeignSheets { path: PathBuf, sheets: Vec<String> },
    /// The table does not hold exactly one row per slot
    TableShape(usize),
    /// The slot limit is outside 1..=200
    InvalidLimit(usize),
    /// A create/update call for a slot failed
    RemoteCallFailure {
        index: usize,
        action: SlotAction,
        message: String,
    },
}

impl fmt::Display for MetricsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricsError::InvalidDefaultRow => write!(
                f,
                "invalid source value found in {} row; populate it with a name, scope, type and active flag",
                DEFAULT_ROW_LABEL
            ),
            MetricsError::InvalidRow(index) => write!(
                f,
                "invalid source value found in metric {} (slot {})",
                slot_index_to_id(*index),
                index
            ),
            MetricsError::MissingTable { path, sheet } => write!(
                f,
                "source table '{}' not found in {}; run `metrics-cli build-table` first",
                sheet,
                path.display()
            ),
            MetricsError::ForeignSheets { path, sheets } => write!(
                f,
                "{} also holds sheet(s) {} that a rebuild would discard; rerun with --force to drop them",
                path.display(),
                sheets.join(", ")
            ),
            MetricsError::TableShape(rows) => write!(
                f,
                "source table must hold exactly {} slot rows, found {}",
                MAX_SLOTS, rows
            ),
            MetricsError::InvalidLimit(limit) => write!(
                f,
                "limit must be between 1 and {}, got {}",
                MAX_SLOTS, limit
            ),
            MetricsError::RemoteCallFailure {
                index,
                action,
                message,
            } => write!(
                f,
                "{} of {} failed: {}",
                action,
                slot_index_to_id(*index),
                message
            ),
        }
    }
}

impl std::error::Error for MetricsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_identify_offending_slot() {
        assert!(MetricsError::InvalidRow(7).to_string().contains("metric7"));
        assert!(
            MetricsError::InvalidDefaultRow
                .to_string()
                .contains("DEFAULT/EMPTY")
        );
        let failure = MetricsError::RemoteCallFailure {
            index: 3,
            action: SlotAction::Update,
            message: "forbidden".into(),
        };
        assert_eq!(failure.to_string(), "update of metric3 failed: forbidden");
    }

    #[test]
    fn test_foreign_sheets_names_sheets_and_escape_hatch() {
        let err = MetricsError::ForeignSheets {
            path: PathBuf::from("custom_metrics.xlsx"),
            sheets: vec!["Notes".into(), "Archive".into()],
        };
        let message = err.to_string();
        assert!(message.contains("Notes, Archive"));
        assert!(message.contains("--force"));
    }
}
