//! Reconciliation of the source table against a property's custom metrics

pub mod reconciler;
pub mod report;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testing;

use serde::{Deserialize, Serialize};

pub use reconciler::{
    ExecuteOptions, PlannedSlot, ReconciliationPlan, execute_plan, plan_reconciliation, reconcile,
};
pub use report::{SlotOutcome, SyncReport, SyncSummary, export_report_to_excel, render_report};
pub use workflow::MetricWorkflow;

/// What a slot needs to converge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotAction {
    Create,
    Update,
}

impl SlotAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotAction::Create => "create",
            SlotAction::Update => "update",
        }
    }
}

impl std::fmt::Display for SlotAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-slot state: `Pending` until its call returns, then terminal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotStatus {
    Pending,
    Created,
    Updated,
    Failed(String),
}

impl SlotStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SlotStatus::Pending => "Pending",
            SlotStatus::Created => "Created",
            SlotStatus::Updated => "Updated",
            SlotStatus::Failed(_) => "Failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, SlotStatus::Pending)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SlotStatus::Failed(_))
    }

    /// Terminal state reached by a successful call for `action`
    pub fn succeeded(action: SlotAction) -> Self {
        match action {
            SlotAction::Create => SlotStatus::Created,
            SlotAction::Update => SlotStatus::Updated,
        }
    }
}
