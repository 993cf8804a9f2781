//! HTTP client for the Google Analytics Management API (v3)

use std::fmt;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Method, Request, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use super::config::ApiConfig;
use super::error::{ApiError, extract_message};
use super::models::{
    AccountSummary, ItemsResponse, MetricPayload, PropertyTarget, RemoteMetric, UpdateOptions,
    WireCustomMetric, to_wire_id,
};
use super::service::MetricsService;

/// Partial response selectors, matching what the reconciler reads
const ACCOUNT_FIELDS: &str = "items(id,name,webProperties(id,name))";
const METRIC_FIELDS: &str = "items(id,name,scope,type,active)";

/// Management API client authenticated with an OAuth bearer token
#[derive(Clone)]
pub struct AnalyticsClient {
    client: Client,
    config: ApiConfig,
    access_token: String,
}

impl fmt::Debug for AnalyticsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyticsClient")
            .field("base_url", &self.config.base_url)
            .field("timeout", &self.config.timeout)
            .field("has_token", &!self.access_token.is_empty())
            .finish()
    }
}

impl AnalyticsClient {
    pub fn new(config: ApiConfig, access_token: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            config,
            access_token: access_token.into(),
        })
    }

    fn metrics_url(&self, target: &PropertyTarget) -> String {
        format!(
            "{}/management/accounts/{}/webproperties/{}/customMetrics",
            self.config.base_url,
            urlencoding::encode(&target.account_id),
            urlencoding::encode(&target.property_id)
        )
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        if self.config.request_logging {
            log::debug!("{} {}", method, url);
        }
        self.client
            .request(method, url)
            .bearer_auth(&self.access_token)
    }

    fn build(req: RequestBuilder) -> Result<Request, ApiError> {
        req.build()
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))
    }

    fn accounts_request(&self) -> Result<Request, ApiError> {
        let url = format!("{}/management/accountSummaries", self.config.base_url);
        Self::build(
            self.request(Method::GET, &url)
                .query(&[("fields", ACCOUNT_FIELDS)]),
        )
    }

    fn list_request(&self, target: &PropertyTarget) -> Result<Request, ApiError> {
        let url = self.metrics_url(target);
        Self::build(
            self.request(Method::GET, &url)
                .query(&[("fields", METRIC_FIELDS)]),
        )
    }

    /// POST a new metric; the service assigns the next free index
    fn insert_request(
        &self,
        target: &PropertyTarget,
        payload: &MetricPayload,
    ) -> Result<Request, ApiError> {
        let url = self.metrics_url(target);
        Self::build(self.request(Method::POST, &url).json(payload))
    }

    /// PUT over `ga:<metric_id>`, keeping data source links when `preserve_links` is set
    fn update_request(
        &self,
        target: &PropertyTarget,
        metric_id: &str,
        payload: &MetricPayload,
        options: UpdateOptions,
    ) -> Result<Request, ApiError> {
        let url = format!(
            "{}/{}",
            self.metrics_url(target),
            urlencoding::encode(&to_wire_id(metric_id))
        );
        Self::build(
            self.request(Method::PUT, &url)
                .query(&[(
                    "ignoreCustomDataSourceLinks",
                    if options.preserve_links { "true" } else { "false" },
                )])
                .json(payload),
        )
    }

    async fn send<T: DeserializeOwned>(&self, req: Request) -> Result<T, ApiError> {
        let resp = self
            .client
            .execute(req)
            .await
            .map_err(Self::map_network_error)?;
        if !resp.status().is_success() {
            return Err(Self::map_error(resp).await);
        }
        resp.json::<T>()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    /// Map a non-2xx response to an `ApiError`
    async fn map_error(resp: Response) -> ApiError {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        let message = extract_message(&body);
        let or_default = |fallback: &str| {
            if message.is_empty() {
                fallback.to_string()
            } else {
                message.clone()
            }
        };

        match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
            StatusCode::FORBIDDEN => ApiError::Forbidden(or_default("forbidden")),
            StatusCode::NOT_FOUND => ApiError::NotFound(or_default("resource not found")),
            StatusCode::BAD_REQUEST => ApiError::BadRequest(or_default("bad request")),
            s if s.is_server_error() => ApiError::ServerError(or_default(&format!("status {s}"))),
            _ => ApiError::ServerError(format!("unexpected status {status}: {message}")),
        }
    }

    /// Map a reqwest error (network/timeout) to an `ApiError`
    fn map_network_error(e: reqwest::Error) -> ApiError {
        if e.is_timeout() {
            ApiError::Network(format!("request timed out: {e}"))
        } else if e.is_connect() {
            ApiError::Network(format!("connection failed: {e}"))
        } else {
            ApiError::Network(e.to_string())
        }
    }
}

#[async_trait]
impl MetricsService for AnalyticsClient {
    async fn account_summaries(&self) -> Result<Vec<AccountSummary>, ApiError> {
        let response: ItemsResponse<AccountSummary> = self.send(self.accounts_request()?).await?;
        Ok(response.items)
    }

    async fn list_metrics(&self, target: &PropertyTarget) -> Result<Vec<RemoteMetric>, ApiError> {
        let response: ItemsResponse<WireCustomMetric> =
            self.send(self.list_request(target)?).await?;
        Ok(response
            .items
            .into_iter()
            .map(|m| m.into_remote(target))
            .collect())
    }

    async fn insert_metric(
        &self,
        target: &PropertyTarget,
        payload: &MetricPayload,
    ) -> Result<RemoteMetric, ApiError> {
        let created: WireCustomMetric = self.send(self.insert_request(target, payload)?).await?;
        Ok(created.into_remote(target))
    }

    async fn update_metric(
        &self,
        target: &PropertyTarget,
        metric_id: &str,
        payload: &MetricPayload,
        options: UpdateOptions,
    ) -> Result<RemoteMetric, ApiError> {
        let req = self.update_request(target, metric_id, payload, options)?;
        let updated: WireCustomMetric = self.send(req).await?;
        Ok(updated.into_remote(target))
    }
}
