//! Core Operation types for custom metric create/update calls

use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::models::{MetricPayload, PropertyTarget, RemoteMetric, UpdateOptions};
use crate::api::service::MetricsService;
use crate::source::slot::slot_index_to_id;
use crate::sync::SlotAction;

/// A single write against the custom metrics of a property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// Create a new metric for a slot that has no remote counterpart
    Create {
        /// 1-based slot the metric is created for
        slot: usize,
        /// Desired values
        payload: MetricPayload,
    },
    /// Update the metric that already occupies a slot
    Update {
        /// 1-based slot
        slot: usize,
        /// Positional metric id (e.g. "metric5")
        metric_id: String,
        /// Desired values
        payload: MetricPayload,
        /// Update behavior
        options: UpdateOptions,
    },
}

/// Result of executing an Operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult {
    /// The operation that was executed
    pub operation: Operation,
    /// The metric as returned by the service, even when it landed in another slot
    pub metric: Option<RemoteMetric>,
    /// Error message if the call failed or wrote the wrong slot
    pub error: Option<String>,
}

impl Operation {
    /// Create a new Create operation
    pub fn create(slot: usize, payload: MetricPayload) -> Self {
        Self::Create { slot, payload }
    }

    /// Create a new Update operation
    pub fn update(
        slot: usize,
        metric_id: impl Into<String>,
        payload: MetricPayload,
        options: UpdateOptions,
    ) -> Self {
        Self::Update {
            slot,
            metric_id: metric_id.into(),
            payload,
            options,
        }
    }

    /// Slot this operation reconciles
    pub fn slot(&self) -> usize {
        match self {
            Self::Create { slot, .. } | Self::Update { slot, .. } => *slot,
        }
    }

    pub fn payload(&self) -> &MetricPayload {
        match self {
            Self::Create { payload, .. } | Self::Update { payload, .. } => payload,
        }
    }

    pub fn action(&self) -> SlotAction {
        match self {
            Self::Create { .. } => SlotAction::Create,
            Self::Update { .. } => SlotAction::Update,
        }
    }

    /// Metric id the slot must end up with
    pub fn expected_id(&self) -> String {
        slot_index_to_id(self.slot())
    }

    /// Execute this operation against a metrics service
    pub async fn execute(
        &self,
        service: &dyn MetricsService,
        target: &PropertyTarget,
    ) -> OperationResult {
        let outcome = match self {
            Self::Create { payload, .. } => service.insert_metric(target, payload).await,
            Self::Update {
                metric_id,
                payload,
                options,
                ..
            } => {
                service
                    .update_metric(target, metric_id, payload, *options)
                    .await
            }
        };
        OperationResult::from_outcome(self.clone(), outcome)
    }
}

impl OperationResult {
    /// Create a new successful result
    pub fn success(operation: Operation, metric: RemoteMetric) -> Self {
        Self {
            operation,
            metric: Some(metric),
            error: None,
        }
    }

    /// Create a new error result
    pub fn error(operation: Operation, error: String) -> Self {
        Self {
            operation,
            metric: None,
            error: Some(error),
        }
    }

    /// A call that succeeded but returned a metric for another slot counts as failed.
    ///
    /// Creates take whatever index the service assigns next, so a create for
    /// slot 5 lands in `metric4` when slot 4 is still free remotely.
    fn from_outcome(operation: Operation, outcome: Result<RemoteMetric, ApiError>) -> Self {
        match outcome {
            Ok(metric) => {
                let expected = operation.expected_id();
                if metric.id == expected {
                    Self::success(operation, metric)
                } else {
                    let error = format!("service wrote {} instead of {}", metric.id, expected);
                    Self {
                        operation,
                        metric: Some(metric),
                        error: Some(error),
                    }
                }
            }
            Err(e) => Self::error(operation, e.to_string()),
        }
    }
}
