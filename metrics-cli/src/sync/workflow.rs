//! Two-phase metric management workflow
//!
//! Phase one builds (or reformats) the source table; phase two loads and
//! validates it once, then reconciles the loaded specs against the remote
//! state. Any front end (CLI, service, UI) drives the same object.

use anyhow::Result;

use crate::api::{MetricsService, PropertyTarget};
use crate::source::builder::{build_source_data, validate_table};
use crate::source::excel::{BuildOutcome, TableRef, read_source_table, write_source_table};
use crate::source::row::MetricSpec;
use crate::source::validator::EnumMatch;

use super::reconciler::{self, ExecuteOptions, ReconciliationPlan};
use super::report::SyncReport;

#[derive(Debug, Clone)]
pub struct MetricWorkflow {
    table: TableRef,
    enum_match: EnumMatch,
}

impl MetricWorkflow {
    pub fn new(table: TableRef, enum_match: EnumMatch) -> Self {
        Self { table, enum_match }
    }

    pub fn table(&self) -> &TableRef {
        &self.table
    }

    /// Phase one: create or reformat the source table.
    ///
    /// Other sheets in the workbook block the rebuild unless `force` is set.
    pub fn build_table(&self, force: bool) -> Result<BuildOutcome> {
        write_source_table(&self.table, force)
    }

    /// Check the table without building the desired state
    pub fn validate(&self) -> Result<()> {
        let source = read_source_table(&self.table)?;
        validate_table(&source, self.enum_match)?;
        Ok(())
    }

    /// Read and validate the table into one spec per slot.
    ///
    /// This is the only read of the workbook in a sync; everything after it
    /// works on the returned specs.
    pub fn load_desired(&self) -> Result<Vec<MetricSpec>> {
        let source = read_source_table(&self.table)?;
        Ok(build_source_data(&source, self.enum_match)?)
    }

    /// Fetch the remote list once and decide every slot up to `limit`
    pub async fn plan(
        &self,
        service: &dyn MetricsService,
        target: &PropertyTarget,
        desired: &[MetricSpec],
        limit: usize,
    ) -> Result<ReconciliationPlan> {
        log::debug!("Planning {} from {}", target, self.table.path.display());
        reconciler::plan(service, target, desired, limit).await
    }

    /// Phase two: fetch the remote list once, then create/update every slot up to `limit`
    pub async fn reconcile(
        &self,
        service: &dyn MetricsService,
        target: &PropertyTarget,
        desired: &[MetricSpec],
        limit: usize,
        options: ExecuteOptions,
    ) -> Result<SyncReport> {
        log::debug!("Reconciling {} from {}", target, self.table.path.display());
        reconciler::reconcile(service, target, desired, limit, options).await
    }
}
