//! Google Analytics Management API module
//!
//! Wraps the custom metric and account summary endpoints behind the
//! `MetricsService` trait so the reconciler never talks HTTP directly.

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod operations;
pub mod service;

pub use client::AnalyticsClient;
pub use config::{ApiConfig, ApiConfigBuilder};
pub use error::ApiError;
pub use models::{
    AccountSummary, MetricPayload, PropertySummary, PropertyTarget, RemoteMetric, UpdateOptions,
};
pub use operations::{Operation, OperationResult};
pub use service::MetricsService;
