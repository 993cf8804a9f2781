//! Read the source table from an Excel workbook

use anyhow::{Context, Result};
use calamine::{Data, Range, Reader, Xlsx, open_workbook};

use super::TableRef;
use super::layout;
use crate::source::builder::SourceTable;
use crate::source::row::MetricRow;
use crate::source::slot::MAX_SLOTS;

/// Read the DEFAULT/EMPTY row and all slot rows.
///
/// A missing file or sheet is reported as `MetricsError::MissingTable`.
pub fn read_source_table(table: &TableRef) -> Result<SourceTable> {
    let range = open_sheet(table)?.ok_or_else(|| table.missing_error())?;
    Ok(table_from_range(&range))
}

/// Open the table sheet, or `None` if the workbook or sheet does not exist yet
pub(crate) fn open_sheet(table: &TableRef) -> Result<Option<Range<Data>>> {
    if !table.path.exists() {
        return Ok(None);
    }

    let mut workbook: Xlsx<_> = open_workbook(&table.path)
        .with_context(|| format!("Failed to open Excel file: {}", table.path.display()))?;

    if !workbook.sheet_names().iter().any(|n| n == &table.sheet_name) {
        log::debug!(
            "Sheet '{}' not present in {} (sheets: {:?})",
            table.sheet_name,
            table.path.display(),
            workbook.sheet_names()
        );
        return Ok(None);
    }

    let range = workbook
        .worksheet_range(&table.sheet_name)
        .with_context(|| format!("Failed to read sheet: {}", table.sheet_name))?;
    Ok(Some(range))
}

/// Sheet names other than the table sheet, if the workbook exists
pub(crate) fn other_sheets(table: &TableRef) -> Result<Vec<String>> {
    if !table.path.exists() {
        return Ok(Vec::new());
    }
    let workbook: Xlsx<_> = open_workbook(&table.path)
        .with_context(|| format!("Failed to open Excel file: {}", table.path.display()))?;
    Ok(workbook
        .sheet_names()
        .into_iter()
        .filter(|n| n != &table.sheet_name)
        .collect())
}

pub(crate) fn table_from_range(range: &Range<Data>) -> SourceTable {
    let mut source = SourceTable::with_default(read_row(range, layout::DEFAULT_ROW));
    for index in 1..=MAX_SLOTS {
        source.set_row(index, read_row(range, layout::slot_row(index)));
    }
    source
}

fn read_row(range: &Range<Data>, row: u32) -> MetricRow {
    let cell = |col: u16| cell_to_string(range.get_value((row, col as u32)));
    MetricRow::new(
        cell(layout::NAME_COL),
        cell(layout::SCOPE_COL),
        cell(layout::TYPE_COL),
        cell(layout::ACTIVE_COL),
    )
}

/// Convert a cell to the string the operator typed.
///
/// Cells are formatted as text, but a hand-edited sheet may still carry
/// booleans or numbers, which are rendered the way a spreadsheet would show them.
fn cell_to_string(cell: Option<&Data>) -> String {
    match cell {
        None | Some(Data::Empty) => String::new(),
        Some(Data::String(s)) => s.clone(),
        Some(Data::Bool(b)) => b.to_string(),
        Some(Data::Int(i)) => i.to_string(),
        Some(Data::Float(f)) => {
            if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Some(Data::DateTime(dt)) => format!("{}", dt),
        Some(Data::DateTimeIso(s)) | Some(Data::DurationIso(s)) => s.clone(),
        Some(Data::Error(e)) => e.to_string(),
    }
}
