//! Positional slot identity
//!
//! Slot `N` (1-based) always maps to the remote custom metric `metricN`.
//! Call sites go through these two functions instead of formatting or
//! parsing the identifier themselves.

/// Number of custom metric slots available on a property
pub const MAX_SLOTS: usize = 200;

/// Prefix shared by every positional metric identifier
pub const SLOT_ID_PREFIX: &str = "metric";

/// Label used for the default/fallback row in messages and in the table
pub const DEFAULT_ROW_LABEL: &str = "DEFAULT/EMPTY";

/// Convert a 1-based slot index into its metric identifier (e.g. 5 -> "metric5")
pub fn slot_index_to_id(index: usize) -> String {
    format!("{}{}", SLOT_ID_PREFIX, index)
}

/// Convert a metric identifier back to its 1-based slot index.
///
/// Returns `None` for anything that is not exactly `metric<N>` with N in 1..=200.
pub fn id_to_slot_index(id: &str) -> Option<usize> {
    let digits = id.strip_prefix(SLOT_ID_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) || digits.starts_with('0') {
        return None;
    }
    let index: usize = digits.parse().ok()?;
    (1..=MAX_SLOTS).contains(&index).then_some(index)
}
