//! Custom metric operations
//!
//! One operation per reconciled slot, executed one at a time against a
//! `MetricsService`.

pub mod operation;

pub use operation::{Operation, OperationResult};
