//! Build or reformat the source table workbook
//!
//! Rebuilding is idempotent: values already in the sheet are carried over,
//! only labels, formatting and validation rules are rewritten. The workbook is
//! written from scratch, so other sheets are only discarded when forced.

use anyhow::{Context, Result};
use rust_xlsxwriter::{DataValidation, Format, Workbook, Worksheet};

use super::TableRef;
use super::layout;
use super::reader::{open_sheet, other_sheets, table_from_range};
use crate::error::MetricsError;
use crate::source::builder::{SourceTable, hard_defaults};
use crate::source::row::{ACTIVE_VALUES, MetricRow, MetricScope, MetricType};
use crate::source::slot::{DEFAULT_ROW_LABEL, MAX_SLOTS, slot_index_to_id};
use crate::source::validator::is_empty;

/// What a build/reformat run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
    /// The sheet already existed and its values were kept
    pub reformatted: bool,
    /// The DEFAULT/EMPTY row was blank and got the hard defaults
    pub filled_default: bool,
    /// Slot rows that carried a value
    pub populated_slots: usize,
    /// Sheets of the old workbook that were discarded (only with `force`)
    pub dropped_sheets: Vec<String>,
}

/// Create the table sheet, or reformat it in place.
///
/// Fails with `MetricsError::ForeignSheets` when the workbook holds other
/// sheets, unless `force` is set.
pub fn write_source_table(table: &TableRef, force: bool) -> Result<BuildOutcome> {
    let dropped_sheets = other_sheets(table)?;
    if !dropped_sheets.is_empty() {
        if !force {
            return Err(MetricsError::ForeignSheets {
                path: table.path.clone(),
                sheets: dropped_sheets,
            }
            .into());
        }
        log::warn!(
            "Rebuilding {} keeps only sheet '{}'; dropping {:?}",
            table.path.display(),
            table.sheet_name,
            dropped_sheets
        );
    }

    let existing = open_sheet(table)?.map(|range| table_from_range(&range));
    let reformatted = existing.is_some();
    let mut source = existing.unwrap_or_else(|| SourceTable::with_default(MetricRow::blank()));

    let filled_default = is_empty(&source.default);
    if filled_default {
        source.default = MetricRow::new(
            hard_defaults::NAME,
            hard_defaults::SCOPE,
            hard_defaults::TYPE,
            hard_defaults::ACTIVE,
        );
    }

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(&table.sheet_name)?;
    write_table(worksheet, &source)?;

    workbook
        .save(&table.path)
        .with_context(|| format!("Failed to save Excel file: {}", table.path.display()))?;

    let populated_slots = source.rows().iter().filter(|r| !is_empty(r)).count();
    log::info!(
        "Source table written to {} ({} populated slots)",
        table.path.display(),
        populated_slots
    );

    Ok(BuildOutcome {
        reformatted,
        filled_default,
        populated_slots,
        dropped_sheets,
    })
}

fn write_table(ws: &mut Worksheet, source: &SourceTable) -> Result<()> {
    let text = Format::new().set_num_format("@");
    let bold = Format::new().set_bold().set_num_format("@");

    for col in layout::LABEL_COL..=layout::ACTIVE_COL {
        ws.set_column_format(col, &text)?;
    }
    ws.set_column_width(layout::LABEL_COL, 16)?;
    ws.set_column_width(layout::NAME_COL, 32)?;
    ws.set_column_width(layout::SCOPE_COL, 12)?;
    ws.set_column_width(layout::TYPE_COL, 12)?;
    ws.set_column_width(layout::ACTIVE_COL, 10)?;
    ws.set_freeze_panes(layout::DEFAULT_ROW, layout::NAME_COL)?;

    for (offset, header) in layout::HEADERS.iter().enumerate() {
        ws.write_string_with_format(
            layout::HEADER_ROW,
            layout::NAME_COL + offset as u16,
            *header,
            &bold,
        )?;
    }

    ws.write_string_with_format(layout::DEFAULT_ROW, layout::LABEL_COL, DEFAULT_ROW_LABEL, &bold)?;
    write_row(ws, layout::DEFAULT_ROW, &source.default, &text)?;

    for index in 1..=MAX_SLOTS {
        let row = layout::slot_row(index);
        ws.write_string_with_format(row, layout::LABEL_COL, slot_index_to_id(index), &text)?;
        if let Some(values) = source.row(index) {
            write_row(ws, row, values, &text)?;
        }
    }

    add_validations(ws)?;
    Ok(())
}

/// Write the non-blank cells of a row; blank cells keep the column's text format
fn write_row(ws: &mut Worksheet, row: u32, values: &MetricRow, text: &Format) -> Result<()> {
    for (offset, value) in values.cells().iter().enumerate() {
        if !value.is_empty() {
            ws.write_string_with_format(row, layout::NAME_COL + offset as u16, *value, text)?;
        }
    }
    Ok(())
}

/// Restrict Scope, Type and Active (default row and every slot) to their enumerations
fn add_validations(ws: &mut Worksheet) -> Result<()> {
    let scopes: Vec<&str> = MetricScope::all_variants().iter().map(|s| s.as_str()).collect();
    let types: Vec<&str> = MetricType::all_variants().iter().map(|t| t.as_str()).collect();

    let rules = [
        (
            layout::SCOPE_COL,
            DataValidation::new()
                .allow_list_strings(scopes.as_slice())?
                .set_error_message("Scope must be one of HIT or PRODUCT")?,
        ),
        (
            layout::TYPE_COL,
            DataValidation::new()
                .allow_list_strings(types.as_slice())?
                .set_error_message("Type must be one of INTEGER, CURRENCY or TIME")?,
        ),
        (
            layout::ACTIVE_COL,
            DataValidation::new()
                .allow_list_strings(ACTIVE_VALUES.as_slice())?
                .set_error_message("Active must be one of true or false")?,
        ),
    ];

    for (col, rule) in &rules {
        ws.add_data_validation(layout::DEFAULT_ROW, *col, layout::LAST_SLOT_ROW, *col, rule)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::excel::read_source_table;
    use std::path::{Path, PathBuf};

    fn temp_workbook() -> PathBuf {
        std::env::temp_dir().join(format!("metrics-cli-{}.xlsx", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_fresh_build_fills_default_row() {
        let table = TableRef::new(temp_workbook(), "Source_CustomMetric");

        let outcome = write_source_table(&table, false).unwrap();
        let source = read_source_table(&table).unwrap();
        let _ = std::fs::remove_file(&table.path);

        assert!(!outcome.reformatted);
        assert!(outcome.filled_default);
        assert_eq!(outcome.populated_slots, 0);
        assert_eq!(source.default, MetricRow::new("(n/a)", "HIT", "INTEGER", "false"));
        assert!(source.rows().iter().all(is_empty));
    }

    #[test]
    fn test_reformat_keeps_existing_values() {
        let table = TableRef::new(temp_workbook(), "Source_CustomMetric");

        // Hand-made sheet: no labels or validation, custom default and one slot
        let mut workbook = Workbook::new();
        let ws = workbook.add_worksheet();
        ws.set_name("Source_CustomMetric").unwrap();
        for (col, value) in ["Sessions", "HIT", "INTEGER", "true"].iter().enumerate() {
            ws.write_string(layout::DEFAULT_ROW, col as u16 + 1, *value).unwrap();
        }
        for (col, value) in ["Revenue", "PRODUCT", "CURRENCY", "true"].iter().enumerate() {
            ws.write_string(layout::slot_row(5), col as u16 + 1, *value).unwrap();
        }
        workbook.save(&table.path).unwrap();

        let first = write_source_table(&table, false).unwrap();
        let second = write_source_table(&table, false).unwrap();
        let source = read_source_table(&table).unwrap();
        let _ = std::fs::remove_file(&table.path);

        assert!(first.reformatted);
        assert!(!first.filled_default);
        assert_eq!(first, second);
        assert_eq!(source.default, MetricRow::new("Sessions", "HIT", "INTEGER", "true"));
        assert_eq!(
            source.row(5),
            Some(&MetricRow::new("Revenue", "PRODUCT", "CURRENCY", "true"))
        );
        assert_eq!(second.populated_slots, 1);
    }

    fn workbook_with_notes(path: &Path) {
        let mut workbook = Workbook::new();
        let ws = workbook.add_worksheet();
        ws.set_name("Source_CustomMetric").unwrap();
        ws.write_string(layout::slot_row(1), layout::NAME_COL, "Revenue").unwrap();
        let notes = workbook.add_worksheet();
        notes.set_name("OperatorNotes").unwrap();
        notes.write_string(0, 0, "keep me").unwrap();
        workbook.save(path).unwrap();
    }

    fn sheet_names(path: &Path) -> Vec<String> {
        use calamine::{Reader, Xlsx, open_workbook};
        let workbook: Xlsx<_> = open_workbook(path).unwrap();
        workbook.sheet_names()
    }

    #[test]
    fn test_rebuild_refuses_to_drop_other_sheets() {
        let path = temp_workbook();
        workbook_with_notes(&path);
        let table = TableRef::new(path.clone(), "Source_CustomMetric");

        let err = write_source_table(&table, false).unwrap_err();
        let sheets = sheet_names(&path);
        let _ = std::fs::remove_file(&path);

        assert_eq!(
            err.downcast_ref::<MetricsError>(),
            Some(&MetricsError::ForeignSheets {
                path,
                sheets: vec!["OperatorNotes".to_string()],
            })
        );
        assert_eq!(sheets, vec!["Source_CustomMetric", "OperatorNotes"]);
    }

    #[test]
    fn test_forced_rebuild_drops_other_sheets() {
        let path = temp_workbook();
        workbook_with_notes(&path);
        let table = TableRef::new(path.clone(), "Source_CustomMetric");

        let outcome = write_source_table(&table, true).unwrap();
        let sheets = sheet_names(&path);
        let _ = std::fs::remove_file(&path);

        assert!(outcome.reformatted);
        assert_eq!(outcome.dropped_sheets, vec!["OperatorNotes".to_string()]);
        assert_eq!(sheets, vec!["Source_CustomMetric"]);
    }

    #[test]
    fn test_missing_sheet_is_missing_table() {
        let path = temp_workbook();
        let mut workbook = Workbook::new();
        workbook.add_worksheet().set_name("Other").unwrap();
        workbook.save(&path).unwrap();

        let table = TableRef::new(path, "Source_CustomMetric");
        let err = read_source_table(&table).unwrap_err();
        let _ = std::fs::remove_file(&table.path);

        assert_eq!(
            err.downcast_ref::<crate::error::MetricsError>(),
            Some(&table.missing_error())
        );
    }
}
