//! Excel workbook adapter for the source table
//!
//! Sheet layout (1-based, as the operator sees it):
//! - row 1: header (Name, Scope, Type, Active)
//! - row 2: DEFAULT/EMPTY row
//! - rows 3..=202: slots 1..=200, column A holds the `metricN` label

pub mod reader;
pub mod writer;

use std::path::PathBuf;

pub use reader::read_source_table;
pub use writer::{BuildOutcome, write_source_table};

/// Sheet name used when none is configured
pub const DEFAULT_SHEET_NAME: &str = "Source_CustomMetric";

/// Zero-based cell coordinates of the table
pub(crate) mod layout {
    use crate::source::slot::MAX_SLOTS;

    pub const HEADER_ROW: u32 = 0;
    pub const DEFAULT_ROW: u32 = 1;
    pub const FIRST_SLOT_ROW: u32 = 2;
    pub const LAST_SLOT_ROW: u32 = FIRST_SLOT_ROW + MAX_SLOTS as u32 - 1;

    pub const LABEL_COL: u16 = 0;
    pub const NAME_COL: u16 = 1;
    pub const SCOPE_COL: u16 = 2;
    pub const TYPE_COL: u16 = 3;
    pub const ACTIVE_COL: u16 = 4;

    pub const HEADERS: [&str; 4] = ["Name", "Scope", "Type", "Active"];

    /// Sheet row holding a 1-based slot
    pub fn slot_row(index: usize) -> u32 {
        FIRST_SLOT_ROW + index as u32 - 1
    }
}

/// Named reference to the workbook sheet holding the table.
///
/// Passed explicitly to every reader/writer instead of being looked up globally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub path: PathBuf,
    pub sheet_name: String,
}

impl TableRef {
    pub fn new(path: impl Into<PathBuf>, sheet_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            sheet_name: sheet_name.into(),
        }
    }

    pub fn missing_error(&self) -> crate::error::MetricsError {
        crate::error::MetricsError::MissingTable {
            path: self.path.clone(),
            sheet: self.sheet_name.clone(),
        }
    }
}
