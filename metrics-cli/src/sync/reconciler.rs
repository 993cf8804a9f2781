//! Slot-by-slot reconciliation
//!
//! Matching is purely positional: slot `i` corresponds to remote metric
//! `metric<i>`. A slot whose metric exists is updated, any other slot is
//! created. Slots are processed in increasing order, one call at a time.

use std::collections::HashMap;

use chrono::Local;

use crate::api::{MetricPayload, MetricsService, Operation, PropertyTarget, RemoteMetric, UpdateOptions};
use crate::error::MetricsError;
use crate::source::row::MetricSpec;
use crate::source::slot::{MAX_SLOTS, id_to_slot_index, slot_index_to_id};

use super::report::{SlotOutcome, SyncReport};
use super::{SlotAction, SlotStatus};

/// Decision for a single slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedSlot {
    /// 1-based slot index
    pub index: usize,
    pub action: SlotAction,
    /// Desired values for the slot
    pub spec: MetricSpec,
    /// Remote values currently in the slot, for updates
    pub current: Option<RemoteMetric>,
}

impl PlannedSlot {
    /// Whether an update would rewrite the slot with the values it already has
    pub fn is_unchanged(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|remote| self.spec.matches_remote(remote))
    }

    pub fn operation(&self) -> Operation {
        let payload = MetricPayload::from(&self.spec);
        match self.action {
            SlotAction::Create => Operation::create(self.index, payload),
            SlotAction::Update => Operation::update(
                self.index,
                slot_index_to_id(self.index),
                payload,
                UpdateOptions {
                    preserve_links: true,
                },
            ),
        }
    }
}

/// Create/update decisions for slots 1..=limit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationPlan {
    pub target: PropertyTarget,
    pub limit: usize,
    pub slots: Vec<PlannedSlot>,
}

impl ReconciliationPlan {
    pub fn creates(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| s.action == SlotAction::Create)
            .count()
    }

    pub fn updates(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| s.action == SlotAction::Update)
            .count()
    }
}

/// Options for executing a plan
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecuteOptions {
    /// Stop at the first failed slot; later slots stay `Pending`
    pub fail_fast: bool,
}

/// Decide create vs update for each slot up to `limit`.
///
/// `desired` is the per-slot desired state in slot order; `remote` is the
/// property's metric list, fetched once for the whole run.
pub fn plan_reconciliation(
    target: &PropertyTarget,
    desired: &[MetricSpec],
    remote: &[RemoteMetric],
    limit: usize,
) -> Result<ReconciliationPlan, MetricsError> {
    if limit == 0 || limit > MAX_SLOTS || limit > desired.len() {
        return Err(MetricsError::InvalidLimit(limit));
    }

    let mut by_slot: HashMap<usize, &RemoteMetric> = HashMap::new();
    for metric in remote {
        match id_to_slot_index(&metric.id) {
            Some(index) => {
                by_slot.insert(index, metric);
            }
            None => log::debug!("Ignoring remote metric with non-positional id '{}'", metric.id),
        }
    }

    let slots = desired
        .iter()
        .take(limit)
        .enumerate()
        .map(|(i, spec)| {
            let index = i + 1;
            let current = by_slot.get(&index).map(|m| (*m).clone());
            let action = if current.is_some() {
                SlotAction::Update
            } else {
                SlotAction::Create
            };
            log::debug!(
                "Slot {}: {} ({}{})",
                index,
                action,
                spec.name,
                if spec.is_default_derived() { ", default" } else { "" }
            );
            PlannedSlot {
                index,
                action,
                spec: spec.clone(),
                current,
            }
        })
        .collect();

    Ok(ReconciliationPlan {
        target: target.clone(),
        limit,
        slots,
    })
}

/// Issue one call per planned slot, in slot order.
///
/// A failed call is recorded against its slot and does not stop the run
/// unless `fail_fast` is set.
pub async fn execute_plan(
    service: &dyn MetricsService,
    plan: &ReconciliationPlan,
    options: ExecuteOptions,
) -> SyncReport {
    let mut report = SyncReport::new(plan.target.clone(), plan.limit, false);
    report.outcomes = plan.slots.iter().map(SlotOutcome::pending).collect();

    for (planned, outcome) in plan.slots.iter().zip(report.outcomes.iter_mut()) {
        let result = planned.operation().execute(service, &plan.target).await;

        outcome.status = match result.error {
            None => {
                log::info!("Slot {}: {} ok", planned.index, planned.action);
                SlotStatus::succeeded(planned.action)
            }
            Some(message) => {
                log::warn!(
                    "Slot {}: {} failed: {}",
                    planned.index,
                    planned.action,
                    message
                );
                SlotStatus::Failed(message)
            }
        };

        if options.fail_fast && outcome.status.is_failed() {
            log::warn!("Stopping after slot {} (fail-fast)", planned.index);
            break;
        }
    }

    report.finished_at = Some(Local::now());
    let summary = report.summary();
    log::info!(
        "Reconciliation complete for {}: {} created, {} updated, {} failed, {} pending",
        plan.target,
        summary.created,
        summary.updated,
        summary.failed,
        summary.pending
    );
    report
}

/// Fetch the remote list once and plan against it
pub async fn plan(
    service: &dyn MetricsService,
    target: &PropertyTarget,
    desired: &[MetricSpec],
    limit: usize,
) -> anyhow::Result<ReconciliationPlan> {
    let remote = service.list_metrics(target).await?;
    log::info!("{} custom metrics currently defined on {}", remote.len(), target);
    Ok(plan_reconciliation(target, desired, &remote, limit)?)
}

/// Fetch the remote list once, plan, then execute
pub async fn reconcile(
    service: &dyn MetricsService,
    target: &PropertyTarget,
    desired: &[MetricSpec],
    limit: usize,
    options: ExecuteOptions,
) -> anyhow::Result<SyncReport> {
    let plan = plan(service, target, desired, limit).await?;
    Ok(execute_plan(service, &plan, options).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::builder::{SourceTable, build_source_data};
    use crate::source::row::MetricRow;
    use crate::source::validator::EnumMatch;
    use crate::sync::testing::{Call, FakeMetricsService, remote_metric, target};

    fn desired_with_default() -> Vec<MetricSpec> {
        let table = SourceTable::with_default(MetricRow::new("Sessions", "HIT", "INTEGER", "true"));
        build_source_data(&table, EnumMatch::Strict).unwrap()
    }

    #[test]
    fn test_plan_updates_existing_and_creates_missing() {
        let desired = desired_with_default();
        let remote = vec![remote_metric(5, "Old")];

        let plan = plan_reconciliation(&target(), &desired, &remote, 10).unwrap();

        assert_eq!(plan.slots.len(), 10);
        assert_eq!(plan.updates(), 1);
        assert_eq!(plan.creates(), 9);
        assert_eq!(plan.slots[4].action, SlotAction::Update);
        assert_eq!(plan.slots[4].current.as_ref().map(|m| m.name.as_str()), Some("Old"));
        assert!(plan.slots.iter().map(|s| s.index).eq(1..=10));
    }

    #[test]
    fn test_plan_rejects_out_of_range_limit() {
        let desired = desired_with_default();
        for limit in [0, 201] {
            assert_eq!(
                plan_reconciliation(&target(), &desired, &[], limit),
                Err(MetricsError::InvalidLimit(limit))
            );
        }
        assert_eq!(
            plan_reconciliation(&target(), &desired[..3], &[], 4),
            Err(MetricsError::InvalidLimit(4))
        );
    }

    #[test]
    fn test_plan_ignores_remote_metrics_beyond_limit() {
        let desired = desired_with_default();
        let remote = vec![remote_metric(11, "Beyond")];

        let plan = plan_reconciliation(&target(), &desired, &remote, 10).unwrap();
        assert_eq!(plan.updates(), 0);
    }

    #[test]
    fn test_unchanged_slot_is_detected() {
        let desired = desired_with_default();
        let mut current = remote_metric(1, "Sessions");
        current.active = true;

        let plan = plan_reconciliation(&target(), &desired, &[current], 2).unwrap();
        assert!(plan.slots[0].is_unchanged());
        assert!(!plan.slots[1].is_unchanged());
    }

    #[tokio::test]
    async fn test_one_update_and_nine_creates() {
        let mut table = SourceTable::with_default(MetricRow::new("Sessions", "HIT", "INTEGER", "true"));
        table.set_row(5, MetricRow::new("Revenue", "PRODUCT", "CURRENCY", "true"));
        let desired = build_source_data(&table, EnumMatch::Strict).unwrap();
        let service = FakeMetricsService::with_metrics(vec![remote_metric(5, "Old")]);

        let report = reconcile(&service, &target(), &desired, 10, ExecuteOptions::default())
            .await
            .unwrap();

        let calls = service.calls();
        assert_eq!(calls.len(), 10);
        let updates: Vec<_> = calls
            .iter()
            .filter_map(|c| match c {
                Call::Update {
                    metric_id,
                    payload,
                    options,
                } => Some((metric_id.clone(), payload.clone(), *options)),
                Call::Insert(_) => None,
            })
            .collect();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].0, "metric5");
        assert_eq!(updates[0].1, MetricPayload::from(&desired[4]));
        assert!(updates[0].2.preserve_links);

        for call in &calls {
            if let Call::Insert(payload) = call {
                assert_eq!(payload.name, "Sessions");
            }
        }

        let summary = report.summary();
        assert_eq!(summary.created, 9);
        assert_eq!(summary.updated, 1);
        assert_eq!(summary.failed, 0);
        assert_eq!(report.outcomes[4].status, SlotStatus::Updated);
        assert_eq!(service.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_second_run_only_updates() {
        let desired = desired_with_default();
        let service = FakeMetricsService::new();

        let first = reconcile(&service, &target(), &desired, 10, ExecuteOptions::default())
            .await
            .unwrap();
        assert_eq!(first.summary().created, 10);

        let second = reconcile(&service, &target(), &desired, 10, ExecuteOptions::default())
            .await
            .unwrap();
        let summary = second.summary();
        assert_eq!(summary.created, 0);
        assert_eq!(summary.updated, 10);
        assert_eq!(service.metrics().len(), 10);
    }

    #[tokio::test]
    async fn test_failed_slot_does_not_stop_run() {
        let desired = desired_with_default();
        let service = FakeMetricsService::with_metrics(vec![remote_metric(2, "Old")]).failing_on(&[2]);

        let report = reconcile(&service, &target(), &desired, 4, ExecuteOptions::default())
            .await
            .unwrap();

        assert!(report.outcomes[1].status.is_failed());
        assert_eq!(report.outcomes[2].status, SlotStatus::Created);
        assert_eq!(report.outcomes[3].status, SlotStatus::Created);
        assert!(report.outcomes.iter().all(|o| o.status.is_terminal()));

        let failures = report.failures();
        assert_eq!(failures.len(), 1);
        assert!(matches!(
            &failures[0],
            MetricsError::RemoteCallFailure { index: 2, action: SlotAction::Update, .. }
        ));
    }

    #[tokio::test]
    async fn test_create_landing_in_another_slot_is_a_failure() {
        let desired = desired_with_default();
        let service =
            FakeMetricsService::with_metrics(vec![remote_metric(1, "Hidden")]).unlisted(&["metric1"]);

        let report = reconcile(&service, &target(), &desired, 1, ExecuteOptions::default())
            .await
            .unwrap();

        let outcome = &report.outcomes[0];
        assert_eq!(outcome.metric_id, "metric1");
        assert_eq!(outcome.action, SlotAction::Create);
        assert!(matches!(&outcome.status, SlotStatus::Failed(m) if m.contains("metric2")));
        assert_eq!(report.summary().created, 0);
        assert!(matches!(
            &report.failures()[0],
            MetricsError::RemoteCallFailure { index: 1, action: SlotAction::Create, .. }
        ));
    }

    #[tokio::test]
    async fn test_fail_fast_leaves_remaining_slots_pending() {
        let desired = desired_with_default();
        let service = FakeMetricsService::new().failing_on(&[2]);

        let report = reconcile(
            &service,
            &target(),
            &desired,
            5,
            ExecuteOptions { fail_fast: true },
        )
        .await
        .unwrap();

        assert_eq!(report.outcomes[0].status, SlotStatus::Created);
        assert!(report.outcomes[1].status.is_failed());
        assert!(report.outcomes[2..].iter().all(|o| o.status == SlotStatus::Pending));
        assert_eq!(service.calls().len(), 2);
    }
}
