//! Wire and domain models for the Analytics Management API

use serde::{Deserialize, Serialize};

use crate::source::row::{MetricScope, MetricSpec, MetricType};

/// Prefix the API puts in front of positional metric identifiers
pub const WIRE_ID_PREFIX: &str = "ga:";

/// Account and property a run is scoped to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyTarget {
    pub account_id: String,
    pub property_id: String,
}

impl PropertyTarget {
    pub fn new(account_id: impl Into<String>, property_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            property_id: property_id.into(),
        }
    }
}

impl std::fmt::Display for PropertyTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.account_id, self.property_id)
    }
}

/// A custom metric as currently defined on a property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteMetric {
    /// Positional identifier without the API prefix (e.g. "metric5")
    pub id: String,
    pub account_id: String,
    pub property_id: String,
    pub name: String,
    pub scope: MetricScope,
    pub metric_type: MetricType,
    pub active: bool,
}

/// Body of an insert or update request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricPayload {
    pub name: String,
    pub scope: MetricScope,
    #[serde(rename = "type")]
    pub metric_type: MetricType,
    pub active: bool,
}

impl From<&MetricSpec> for MetricPayload {
    fn from(spec: &MetricSpec) -> Self {
        Self {
            name: spec.name.clone(),
            scope: spec.scope,
            metric_type: spec.metric_type,
            active: spec.active,
        }
    }
}

/// Options for updating an existing metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateOptions {
    /// Keep custom data source links pointing at the metric intact while it is updated
    pub preserve_links: bool,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self {
            preserve_links: true,
        }
    }
}

/// An account and the web properties it contains
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub web_properties: Vec<PropertySummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySummary {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Custom metric resource as the API sends it
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireCustomMetric {
    pub id: String,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub web_property_id: Option<String>,
    pub name: String,
    pub scope: MetricScope,
    #[serde(rename = "type")]
    pub metric_type: MetricType,
    pub active: bool,
}

impl WireCustomMetric {
    /// Convert to the domain model, filling ids the partial response left out
    pub fn into_remote(self, target: &PropertyTarget) -> RemoteMetric {
        RemoteMetric {
            id: from_wire_id(&self.id),
            account_id: self.account_id.unwrap_or_else(|| target.account_id.clone()),
            property_id: self
                .web_property_id
                .unwrap_or_else(|| target.property_id.clone()),
            name: self.name,
            scope: self.scope,
            metric_type: self.metric_type,
            active: self.active,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ItemsResponse<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

/// "metric5" -> "ga:metric5"
pub fn to_wire_id(id: &str) -> String {
    if id.starts_with(WIRE_ID_PREFIX) {
        id.to_string()
    } else {
        format!("{}{}", WIRE_ID_PREFIX, id)
    }
}

/// "ga:metric5" -> "metric5"
pub fn from_wire_id(id: &str) -> String {
    id.strip_prefix(WIRE_ID_PREFIX).unwrap_or(id).to_string()
}
