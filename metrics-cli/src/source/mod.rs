//! Source table: the operator-maintained definition of every custom metric slot

pub mod builder;
pub mod excel;
pub mod row;
pub mod slot;
pub mod validator;

pub use builder::{SourceTable, build_source_data, effective_default, validate_table};
pub use excel::{TableRef, read_source_table, write_source_table};
pub use row::{MetricRow, MetricScope, MetricSpec, MetricType};
pub use slot::{MAX_SLOTS, id_to_slot_index, slot_index_to_id};
pub use validator::{EnumMatch, RowClass, classify, is_empty, is_valid};
