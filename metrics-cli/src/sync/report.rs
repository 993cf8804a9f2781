//! Run reports
//!
//! A `SyncReport` records, for every processed slot, the action taken and its
//! terminal state. It can be rendered for the terminal or exported to Excel.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use colored::*;
use rust_xlsxwriter::{Color, Format, Workbook, Worksheet};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::PropertyTarget;
use crate::error::MetricsError;
use crate::source::slot::slot_index_to_id;

use super::reconciler::{PlannedSlot, ReconciliationPlan};
use super::{SlotAction, SlotStatus};

/// Outcome for one slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotOutcome {
    pub index: usize,
    pub metric_id: String,
    pub action: SlotAction,
    /// Name the slot was reconciled to
    pub name: String,
    /// Values came from the DEFAULT/EMPTY row
    pub default_derived: bool,
    /// Remote already held exactly these values
    pub unchanged: bool,
    pub status: SlotStatus,
}

impl SlotOutcome {
    pub fn pending(planned: &PlannedSlot) -> Self {
        Self {
            index: planned.index,
            metric_id: slot_index_to_id(planned.index),
            action: planned.action,
            name: planned.spec.name.clone(),
            default_derived: planned.spec.is_default_derived(),
            unchanged: planned.is_unchanged(),
            status: SlotStatus::Pending,
        }
    }
}

/// Counts per terminal state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSummary {
    pub created: usize,
    pub updated: usize,
    pub failed: usize,
    pub pending: usize,
}

/// Report of a reconciliation run (or of a dry-run plan)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Local>,
    pub finished_at: Option<DateTime<Local>>,
    pub target: PropertyTarget,
    pub limit: usize,
    pub dry_run: bool,
    pub outcomes: Vec<SlotOutcome>,
}

impl SyncReport {
    pub fn new(target: PropertyTarget, limit: usize, dry_run: bool) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Local::now(),
            finished_at: None,
            target,
            limit,
            dry_run,
            outcomes: Vec::new(),
        }
    }

    /// Report for a plan that is shown but not executed
    pub fn from_plan(plan: &ReconciliationPlan) -> Self {
        let mut report = Self::new(plan.target.clone(), plan.limit, true);
        report.outcomes = plan.slots.iter().map(SlotOutcome::pending).collect();
        report
    }

    pub fn summary(&self) -> SyncSummary {
        let mut summary = SyncSummary::default();
        for outcome in &self.outcomes {
            match outcome.status {
                SlotStatus::Pending => summary.pending += 1,
                SlotStatus::Created => summary.created += 1,
                SlotStatus::Updated => summary.updated += 1,
                SlotStatus::Failed(_) => summary.failed += 1,
            }
        }
        summary
    }

    /// Per-slot remote failures
    pub fn failures(&self) -> Vec<MetricsError> {
        self.outcomes
            .iter()
            .filter_map(|o| match &o.status {
                SlotStatus::Failed(message) => Some(MetricsError::RemoteCallFailure {
                    index: o.index,
                    action: o.action,
                    message: message.clone(),
                }),
                _ => None,
            })
            .collect()
    }

    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(|o| o.status.is_failed())
    }
}

/// Render the report as a colored table for the terminal
pub fn render_report(report: &SyncReport) -> String {
    let mut out = String::new();
    let title = if report.dry_run {
        format!("Planned changes for {} (dry run)", report.target)
    } else {
        format!("Custom metric sync for {}", report.target)
    };
    out.push_str(&format!("{}\n", title.bold()));
    out.push_str(&format!(
        "{}\n\n",
        format!("run {} | slots 1..{}", report.run_id, report.limit).dimmed()
    ));

    for outcome in &report.outcomes {
        let status = match &outcome.status {
            SlotStatus::Pending if report.dry_run => "planned".cyan(),
            SlotStatus::Pending => "not attempted".yellow(),
            SlotStatus::Created => "created".green(),
            SlotStatus::Updated => "updated".green(),
            SlotStatus::Failed(_) => "FAILED".red().bold(),
        };
        let mut note = String::new();
        if outcome.default_derived {
            note.push_str(" [default]");
        }
        if outcome.unchanged {
            note.push_str(" [no change]");
        }
        out.push_str(&format!(
            "  {:<10} {:<7} {:<14} {}{}\n",
            outcome.metric_id,
            outcome.action.as_str(),
            status,
            outcome.name,
            note.dimmed()
        ));
        if let SlotStatus::Failed(message) = &outcome.status {
            out.push_str(&format!("             {}\n", message.red()));
        }
    }

    let summary = report.summary();
    out.push('\n');
    if report.dry_run {
        let creates = report
            .outcomes
            .iter()
            .filter(|o| o.action == SlotAction::Create)
            .count();
        out.push_str(&format!(
            "{} create, {} update\n",
            creates,
            report.outcomes.len() - creates
        ));
    } else {
        out.push_str(&format!(
            "{} created, {} updated, {} failed, {} not attempted\n",
            summary.created.to_string().green(),
            summary.updated.to_string().green(),
            if summary.failed > 0 {
                summary.failed.to_string().red()
            } else {
                summary.failed.to_string().normal()
            },
            summary.pending
        ));
    }
    out
}

/// Export a report to an Excel file
pub fn export_report_to_excel(report: &SyncReport, file_path: &str) -> Result<()> {
    let mut workbook = Workbook::new();

    create_summary_sheet(&mut workbook, report)?;
    create_slots_sheet(&mut workbook, report)?;

    workbook
        .save(file_path)
        .with_context(|| format!("Failed to save Excel file: {}", file_path))?;

    log::info!("Sync report exported to: {}", file_path);
    Ok(())
}

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0x4472C4))
        .set_font_color(Color::White)
}

fn create_summary_sheet(workbook: &mut Workbook, report: &SyncReport) -> Result<()> {
    let sheet = workbook.add_worksheet();
    sheet.set_name("Summary")?;

    let title_format = Format::new().set_bold().set_font_size(16);
    let bold = Format::new().set_bold();

    sheet.write_string_with_format(
        0,
        0,
        format!("Custom Metric Sync: {}", report.target),
        &title_format,
    )?;
    sheet.write_string(
        1,
        0,
        format!("Started: {}", report.started_at.format("%Y-%m-%d %H:%M:%S")),
    )?;
    if let Some(finished) = report.finished_at {
        sheet.write_string(
            2,
            0,
            format!("Finished: {}", finished.format("%Y-%m-%d %H:%M:%S")),
        )?;
    }

    let summary = report.summary();
    let rows: [(&str, String); 8] = [
        ("Run ID", report.run_id.to_string()),
        ("Account", report.target.account_id.clone()),
        ("Property", report.target.property_id.clone()),
        ("Slot limit", report.limit.to_string()),
        ("Created", summary.created.to_string()),
        ("Updated", summary.updated.to_string()),
        ("Failed", summary.failed.to_string()),
        ("Not attempted", summary.pending.to_string()),
    ];

    sheet.write_string_with_format(4, 0, "Metric", &header_format())?;
    sheet.write_string_with_format(4, 1, "Value", &header_format())?;
    for (i, (label, value)) in rows.iter().enumerate() {
        let row = 5 + i as u32;
        sheet.write_string_with_format(row, 0, *label, &bold)?;
        sheet.write_string(row, 1, value)?;
    }

    sheet.set_column_width(0, 20)?;
    sheet.set_column_width(1, 40)?;
    Ok(())
}

fn create_slots_sheet(workbook: &mut Workbook, report: &SyncReport) -> Result<()> {
    let sheet = workbook.add_worksheet();
    sheet.set_name("Slots")?;

    let headers = ["Metric", "Action", "Status", "Name", "Default", "Unchanged", "Error"];
    write_headers(sheet, &headers)?;

    for (i, outcome) in report.outcomes.iter().enumerate() {
        let row = 1 + i as u32;
        let error = match &outcome.status {
            SlotStatus::Failed(message) => message.as_str(),
            _ => "",
        };
        sheet.write_string(row, 0, &outcome.metric_id)?;
        sheet.write_string(row, 1, outcome.action.as_str())?;
        sheet.write_string(row, 2, outcome.status.label())?;
        sheet.write_string(row, 3, &outcome.name)?;
        sheet.write_boolean(row, 4, outcome.default_derived)?;
        sheet.write_boolean(row, 5, outcome.unchanged)?;
        if !error.is_empty() {
            sheet.write_string(row, 6, error)?;
        }
    }

    sheet.set_column_width(3, 32)?;
    sheet.set_column_width(6, 48)?;
    Ok(())
}

fn write_headers(sheet: &mut Worksheet, headers: &[&str]) -> Result<()> {
    let format = header_format();
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, &format)?;
    }
    Ok(())
}
