//! Desired-state builder
//!
//! Turns the DEFAULT/EMPTY row plus the 200 slot rows into one `MetricSpec`
//! per slot. The whole table is validated before anything is returned.

use crate::error::MetricsError;

use super::row::{MetricRow, MetricScope, MetricSpec, MetricType, parse_active};
use super::slot::{MAX_SLOTS, slot_index_to_id};
use super::validator::{EnumMatch, RowClass, classify, is_valid};

/// Last-resort values for blank cells of the default row
pub mod hard_defaults {
    pub const NAME: &str = "(n/a)";
    pub const SCOPE: &str = "HIT";
    pub const TYPE: &str = "INTEGER";
    pub const ACTIVE: &str = "false";
}

/// The default row and the slot rows, in slot order 1..=200
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTable {
    pub default: MetricRow,
    rows: Vec<MetricRow>,
}

impl SourceTable {
    pub fn new(default: MetricRow, rows: Vec<MetricRow>) -> Result<Self, MetricsError> {
        if rows.len() != MAX_SLOTS {
            return Err(MetricsError::TableShape(rows.len()));
        }
        Ok(Self { default, rows })
    }

    /// A table whose slots are all blank
    pub fn with_default(default: MetricRow) -> Self {
        Self {
            default,
            rows: vec![MetricRow::blank(); MAX_SLOTS],
        }
    }

    /// Replace the row for a 1-based slot; out-of-range indices are ignored
    pub fn set_row(&mut self, index: usize, row: MetricRow) {
        if let Some(slot) = index.checked_sub(1).and_then(|i| self.rows.get_mut(i)) {
            *slot = row;
        }
    }

    /// Row for a 1-based slot
    pub fn row(&self, index: usize) -> Option<&MetricRow> {
        index.checked_sub(1).and_then(|i| self.rows.get(i))
    }

    pub fn rows(&self) -> &[MetricRow] {
        &self.rows
    }
}

/// The default row with hard defaults applied cell by cell
pub fn effective_default(default: &MetricRow) -> MetricRow {
    fn or_hard(cell: &str, hard: &str) -> String {
        let value = if cell.is_empty() { hard } else { cell };
        value.to_string()
    }

    MetricRow::new(
        or_hard(&default.name, hard_defaults::NAME),
        or_hard(&default.scope, hard_defaults::SCOPE),
        or_hard(&default.metric_type, hard_defaults::TYPE),
        or_hard(&default.active, hard_defaults::ACTIVE),
    )
}

/// Check the default row and every slot row without building anything
pub fn validate_table(table: &SourceTable, mode: EnumMatch) -> Result<(), MetricsError> {
    if !is_valid(&table.default, mode) {
        return Err(MetricsError::InvalidDefaultRow);
    }
    for (i, row) in table.rows.iter().enumerate() {
        if classify(row, mode).is_invalid() {
            return Err(MetricsError::InvalidRow(i + 1));
        }
    }
    Ok(())
}

/// Build the desired state for all 200 slots.
///
/// Fails on the first invalid row; no partial list is ever returned.
pub fn build_source_data(
    table: &SourceTable,
    mode: EnumMatch,
) -> Result<Vec<MetricSpec>, MetricsError> {
    if !is_valid(&table.default, mode) {
        return Err(MetricsError::InvalidDefaultRow);
    }
    let fallback = default_spec(&table.default, mode);

    let mut specs = Vec::with_capacity(MAX_SLOTS);
    for (i, row) in table.rows.iter().enumerate() {
        let index = i + 1;
        match classify(row, mode) {
            RowClass::Invalid => return Err(MetricsError::InvalidRow(index)),
            RowClass::Empty => specs.push(fallback.clone()),
            RowClass::Valid(valid) => specs.push(MetricSpec {
                id: Some(slot_index_to_id(index)),
                name: valid.name,
                scope: valid.scope,
                metric_type: valid.metric_type,
                active: valid.active,
            }),
        }
    }

    log::debug!(
        "Built desired state: {} explicit, {} default-derived",
        specs.iter().filter(|s| !s.is_default_derived()).count(),
        specs.iter().filter(|s| s.is_default_derived()).count()
    );
    Ok(specs)
}

/// Identity-less spec that empty slots resolve to
fn default_spec(default: &MetricRow, mode: EnumMatch) -> MetricSpec {
    let row = effective_default(default);
    MetricSpec {
        id: None,
        scope: MetricScope::parse(&row.scope, mode).unwrap_or(MetricScope::Hit),
        metric_type: MetricType::parse(&row.metric_type, mode).unwrap_or(MetricType::Integer),
        active: parse_active(&row.active, mode).unwrap_or(false),
        name: row.name,
    }
}
