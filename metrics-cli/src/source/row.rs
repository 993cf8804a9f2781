//! Row and metric definition types for the source table

use serde::{Deserialize, Serialize};

use super::validator::EnumMatch;

/// Granularity at which a custom metric is recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MetricScope {
    Hit,
    Product,
}

impl MetricScope {
    /// Literal value used in the table and on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricScope::Hit => "HIT",
            MetricScope::Product => "PRODUCT",
        }
    }

    pub fn all_variants() -> &'static [MetricScope] {
        &[MetricScope::Hit, MetricScope::Product]
    }

    pub fn parse(value: &str, mode: EnumMatch) -> Option<Self> {
        mode.resolve(value, Self::all_variants(), Self::as_str)
    }
}

impl std::fmt::Display for MetricScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value type of a custom metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MetricType {
    Integer,
    Currency,
    Time,
}

impl MetricType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::Integer => "INTEGER",
            MetricType::Currency => "CURRENCY",
            MetricType::Time => "TIME",
        }
    }

    pub fn all_variants() -> &'static [MetricType] {
        &[MetricType::Integer, MetricType::Currency, MetricType::Time]
    }

    pub fn parse(value: &str, mode: EnumMatch) -> Option<Self> {
        mode.resolve(value, Self::all_variants(), Self::as_str)
    }
}

impl std::fmt::Display for MetricType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepted literals for the Active column
pub const ACTIVE_VALUES: [&str; 2] = ["true", "false"];

pub fn parse_active(value: &str, mode: EnumMatch) -> Option<bool> {
    mode.resolve(value, &[true, false], |b| if *b { "true" } else { "false" })
}

/// One raw row of the source table: Name, Scope, Type, Active as typed by the operator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricRow {
    pub name: String,
    pub scope: String,
    pub metric_type: String,
    pub active: String,
}

impl MetricRow {
    pub fn new(
        name: impl Into<String>,
        scope: impl Into<String>,
        metric_type: impl Into<String>,
        active: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            scope: scope.into(),
            metric_type: metric_type.into(),
            active: active.into(),
        }
    }

    /// A row with all four cells blank
    pub fn blank() -> Self {
        Self::default()
    }

    /// Cells in column order
    pub fn cells(&self) -> [&str; 4] {
        [&self.name, &self.scope, &self.metric_type, &self.active]
    }
}

/// Desired state for one slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSpec {
    /// `metric<N>` for rows filled in by the operator; `None` for rows derived from the default row
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub scope: MetricScope,
    #[serde(rename = "type")]
    pub metric_type: MetricType,
    pub active: bool,
}

impl MetricSpec {
    /// Active flag in its table form
    pub fn active_str(&self) -> &'static str {
        if self.active { "true" } else { "false" }
    }

    pub fn is_default_derived(&self) -> bool {
        self.id.is_none()
    }

    /// Whether a remote metric already carries exactly these values
    pub fn matches_remote(&self, remote: &crate::api::RemoteMetric) -> bool {
        self.name == remote.name
            && self.scope == remote.scope
            && self.metric_type == remote.metric_type
            && self.active == remote.active
    }
}
