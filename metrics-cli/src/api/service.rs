//! The remote management service seen by the reconciler

use async_trait::async_trait;

use super::error::ApiError;
use super::models::{AccountSummary, MetricPayload, PropertyTarget, RemoteMetric, UpdateOptions};

/// Operations the reconciler needs from the remote account
#[async_trait]
pub trait MetricsService: Send + Sync {
    /// Accounts and properties visible to the caller
    async fn account_summaries(&self) -> Result<Vec<AccountSummary>, ApiError>;

    /// All custom metrics currently defined on a property
    async fn list_metrics(&self, target: &PropertyTarget) -> Result<Vec<RemoteMetric>, ApiError>;

    /// Create a metric; the service assigns its identifier
    async fn insert_metric(
        &self,
        target: &PropertyTarget,
        payload: &MetricPayload,
    ) -> Result<RemoteMetric, ApiError>;

    /// Replace the definition of an existing metric
    async fn update_metric(
        &self,
        target: &PropertyTarget,
        metric_id: &str,
        payload: &MetricPayload,
        options: UpdateOptions,
    ) -> Result<RemoteMetric, ApiError>;
}
