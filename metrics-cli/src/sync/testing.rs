//! In-memory `MetricsService` used by reconciler and workflow tests

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::{
    AccountSummary, ApiError, MetricPayload, MetricsService, PropertySummary, PropertyTarget,
    RemoteMetric, UpdateOptions,
};
use crate::source::slot::{MAX_SLOTS, id_to_slot_index, slot_index_to_id};

/// A recorded write call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Insert(MetricPayload),
    Update {
        metric_id: String,
        payload: MetricPayload,
        options: UpdateOptions,
    },
}

/// Property that assigns each created metric the lowest free slot, like the real service
#[derive(Debug, Default)]
pub struct FakeMetricsService {
    metrics: Mutex<Vec<RemoteMetric>>,
    calls: Mutex<Vec<Call>>,
    /// Slots whose insert/update calls fail
    failing_slots: HashSet<usize>,
    /// Metrics that exist but are left out of list responses
    unlisted: HashSet<String>,
    list_calls: Mutex<usize>,
}

impl FakeMetricsService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metrics(metrics: Vec<RemoteMetric>) -> Self {
        Self {
            metrics: Mutex::new(metrics),
            ..Self::default()
        }
    }

    pub fn failing_on(mut self, slots: &[usize]) -> Self {
        self.failing_slots.extend(slots.iter().copied());
        self
    }

    /// Hide existing metrics from `list_metrics`, as if created after the list was fetched
    pub fn unlisted(mut self, ids: &[&str]) -> Self {
        self.unlisted.extend(ids.iter().map(|id| id.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn metrics(&self) -> Vec<RemoteMetric> {
        self.metrics.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> usize {
        *self.list_calls.lock().unwrap()
    }

    fn remote(id: &str, target: &PropertyTarget, payload: &MetricPayload) -> RemoteMetric {
        RemoteMetric {
            id: id.to_string(),
            account_id: target.account_id.clone(),
            property_id: target.property_id.clone(),
            name: payload.name.clone(),
            scope: payload.scope,
            metric_type: payload.metric_type,
            active: payload.active,
        }
    }
}

/// Remote metric occupying `slot` with the given values
pub fn remote_metric(slot: usize, name: &str) -> RemoteMetric {
    RemoteMetric {
        id: slot_index_to_id(slot),
        account_id: "123".into(),
        property_id: "UA-123-1".into(),
        name: name.into(),
        scope: crate::source::MetricScope::Hit,
        metric_type: crate::source::MetricType::Integer,
        active: false,
    }
}

pub fn target() -> PropertyTarget {
    PropertyTarget::new("123", "UA-123-1")
}

#[async_trait]
impl MetricsService for FakeMetricsService {
    async fn account_summaries(&self) -> Result<Vec<AccountSummary>, ApiError> {
        Ok(vec![AccountSummary {
            id: "123".into(),
            name: "Test Account".into(),
            web_properties: vec![PropertySummary {
                id: "UA-123-1".into(),
                name: "Test Property".into(),
            }],
        }])
    }

    async fn list_metrics(&self, _target: &PropertyTarget) -> Result<Vec<RemoteMetric>, ApiError> {
        *self.list_calls.lock().unwrap() += 1;
        Ok(self
            .metrics()
            .into_iter()
            .filter(|m| !self.unlisted.contains(&m.id))
            .collect())
    }

    async fn insert_metric(
        &self,
        target: &PropertyTarget,
        payload: &MetricPayload,
    ) -> Result<RemoteMetric, ApiError> {
        self.calls.lock().unwrap().push(Call::Insert(payload.clone()));

        let mut metrics = self.metrics.lock().unwrap();
        let used: HashSet<usize> = metrics.iter().filter_map(|m| id_to_slot_index(&m.id)).collect();
        let slot = (1..=MAX_SLOTS)
            .find(|i| !used.contains(i))
            .ok_or_else(|| ApiError::BadRequest("no free custom metric slots".into()))?;
        if self.failing_slots.contains(&slot) {
            return Err(ApiError::ServerError("backend error".into()));
        }

        let created = Self::remote(&slot_index_to_id(slot), target, payload);
        metrics.push(created.clone());
        Ok(created)
    }

    async fn update_metric(
        &self,
        target: &PropertyTarget,
        metric_id: &str,
        payload: &MetricPayload,
        options: UpdateOptions,
    ) -> Result<RemoteMetric, ApiError> {
        self.calls.lock().unwrap().push(Call::Update {
            metric_id: metric_id.to_string(),
            payload: payload.clone(),
            options,
        });

        if id_to_slot_index(metric_id).is_some_and(|slot| self.failing_slots.contains(&slot)) {
            return Err(ApiError::Forbidden("insufficient permissions".into()));
        }

        let mut metrics = self.metrics.lock().unwrap();
        let existing = metrics
            .iter_mut()
            .find(|m| m.id == metric_id)
            .ok_or_else(|| ApiError::NotFound(metric_id.to_string()))?;
        *existing = Self::remote(metric_id, target, payload);
        Ok(existing.clone())
    }
}
