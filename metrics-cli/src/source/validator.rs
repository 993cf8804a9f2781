//! Row validation
//!
//! A row is either empty (all four cells are exactly `""`), valid (every cell
//! resolves against its enumeration and the name is non-empty), or invalid.
//! Partially filled rows are invalid, never empty.

use serde::{Deserialize, Serialize};

use super::row::{MetricRow, MetricScope, MetricType, parse_active};

/// How enumeration cells are matched against their allowed values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnumMatch {
    /// Cell must equal one of the allowed values
    #[default]
    Strict,
    /// Cell only has to contain one of the allowed values (legacy sheet behavior,
    /// so "HITS" is read as HIT). The first allowed value found wins.
    Substring,
}

impl EnumMatch {
    pub fn label(&self) -> &'static str {
        match self {
            EnumMatch::Strict => "strict",
            EnumMatch::Substring => "substring",
        }
    }

    /// Resolve a cell to one of `variants` using this match mode
    pub fn resolve<T: Copy>(
        &self,
        value: &str,
        variants: &[T],
        literal: impl Fn(&T) -> &'static str,
    ) -> Option<T> {
        variants
            .iter()
            .find(|v| match self {
                EnumMatch::Strict => value == literal(*v),
                EnumMatch::Substring => value.contains(literal(*v)),
            })
            .copied()
    }
}

/// Typed values of a row that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRow {
    pub name: String,
    pub scope: MetricScope,
    pub metric_type: MetricType,
    pub active: bool,
}

/// Outcome of classifying a single row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowClass {
    Empty,
    Valid(ValidRow),
    Invalid,
}

impl RowClass {
    pub fn is_empty(&self) -> bool {
        matches!(self, RowClass::Empty)
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, RowClass::Valid(_))
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, RowClass::Invalid)
    }
}

/// True iff all four cells are the empty string (no trimming)
pub fn is_empty(row: &MetricRow) -> bool {
    row.cells().iter().all(|cell| cell.is_empty())
}

/// True iff the name is non-empty and every enumeration cell resolves
pub fn is_valid(row: &MetricRow, mode: EnumMatch) -> bool {
    parse_valid(row, mode).is_some()
}

/// Resolve a row into typed values, or `None` if it is not valid
pub fn parse_valid(row: &MetricRow, mode: EnumMatch) -> Option<ValidRow> {
    if row.name.is_empty() {
        return None;
    }
    Some(ValidRow {
        name: row.name.clone(),
        scope: MetricScope::parse(&row.scope, mode)?,
        metric_type: MetricType::parse(&row.metric_type, mode)?,
        active: parse_active(&row.active, mode)?,
    })
}

/// Put a row on exactly one of the empty, valid or error paths
pub fn classify(row: &MetricRow, mode: EnumMatch) -> RowClass {
    if is_empty(row) {
        return RowClass::Empty;
    }
    match parse_valid(row, mode) {
        Some(valid) => RowClass::Valid(valid),
        None => RowClass::Invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_row_is_empty() {
        assert!(is_empty(&MetricRow::blank()));
        assert!(!is_valid(&MetricRow::blank(), EnumMatch::Strict));
    }

    #[test]
    fn test_whitespace_row_is_not_empty() {
        let row = MetricRow::new(" ", "", "", "");
        assert!(!is_empty(&row));
        assert_eq!(classify(&row, EnumMatch::Strict), RowClass::Invalid);
    }

    #[test]
    fn test_complete_row_is_valid() {
        let row = MetricRow::new("Revenue", "PRODUCT", "CURRENCY", "true");
        assert!(is_valid(&row, EnumMatch::Strict));
        assert_eq!(
            classify(&row, EnumMatch::Strict),
            RowClass::Valid(ValidRow {
                name: "Revenue".into(),
                scope: MetricScope::Product,
                metric_type: MetricType::Currency,
                active: true,
            })
        );
    }

    #[test]
    fn test_name_only_row_is_invalid_not_empty() {
        let row = MetricRow::new("Revenue", "", "", "");
        assert!(!is_empty(&row));
        assert!(!is_valid(&row, EnumMatch::Strict));
        assert!(classify(&row, EnumMatch::Strict).is_invalid());
    }

    #[test]
    fn test_missing_name_is_invalid() {
        let row = MetricRow::new("", "HIT", "INTEGER", "false");
        assert!(!is_valid(&row, EnumMatch::Strict));
    }

    #[test]
    fn test_strict_rejects_case_and_substrings() {
        assert!(!is_valid(&MetricRow::new("a", "hit", "INTEGER", "true"), EnumMatch::Strict));
        assert!(!is_valid(&MetricRow::new("a", "HITS", "INTEGER", "true"), EnumMatch::Strict));
        assert!(!is_valid(&MetricRow::new("a", "HIT", "INTEGER", "TRUE"), EnumMatch::Strict));
        assert!(!is_valid(&MetricRow::new("a", "HIT", "INTEGERS", "true"), EnumMatch::Strict));
    }

    #[test]
    fn test_substring_mode_accepts_containing_values() {
        let row = MetricRow::new("a", "HITS", "TIME_ON_PAGE", "untrue");
        let valid = parse_valid(&row, EnumMatch::Substring).unwrap();
        assert_eq!(valid.scope, MetricScope::Hit);
        assert_eq!(valid.metric_type, MetricType::Time);
        assert!(valid.active);
    }

    #[test]
    fn test_substring_mode_still_requires_a_token() {
        let row = MetricRow::new("a", "SESSION", "INTEGER", "true");
        assert!(!is_valid(&row, EnumMatch::Substring));
    }
}
