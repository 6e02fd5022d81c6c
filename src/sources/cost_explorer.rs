//! Cost Explorer billing source
//!
//! Speaks the `GetCostAndUsage` JSON protocol (daily granularity, unblended
//! cost, grouped by service) against a configured endpoint, following
//! `NextPageToken` until the result set is exhausted.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::BillingSource;
use crate::config::CostExplorerSettings;
use crate::types::{CostwatchError, DateRange, RawCostEntry, Result};

const TARGET_HEADER: &str = "X-Amz-Target";
const TARGET: &str = "AWSInsightsIndexService.GetCostAndUsage";
const CONTENT_TYPE_JSON: &str = "application/x-amz-json-1.1";
const METRIC: &str = "UnblendedCost";

/// Upper bound on followed pages, guards against a token that never clears
const MAX_PAGES: usize = 1000;

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct GetCostAndUsageRequest<'a> {
    time_period: TimePeriod,
    granularity: &'a str,
    metrics: [&'a str; 1],
    group_by: [GroupDefinition<'a>; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    next_page_token: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct GroupDefinition<'a> {
    #[serde(rename = "Type")]
    kind: &'a str,
    key: &'a str,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TimePeriod {
    start: String,
    #[serde(default)]
    end: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetCostAndUsageResponse {
    #[serde(default)]
    results_by_time: Vec<ResultByTime>,
    next_page_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ResultByTime {
    time_period: TimePeriod,
    #[serde(default)]
    groups: Vec<Group>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Group {
    #[serde(default)]
    keys: Vec<String>,
    #[serde(default)]
    metrics: HashMap<String, MetricValue>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MetricValue {
    amount: Option<String>,
    unit: Option<String>,
}

/// Error body returned by the API on non-2xx responses
#[derive(Deserialize)]
struct ApiError {
    #[serde(rename = "__type", default)]
    kind: String,
    #[serde(alias = "Message", default)]
    message: String,
}

/// Explicitly constructed client for the billing API
pub struct CostExplorerClient {
    http: Client,
    endpoint: reqwest::Url,
    token: Option<String>,
}

impl CostExplorerClient {
    /// Build a client from settings. The bearer token, if any, is read from
    /// the env var named by `token_env`.
    pub fn from_settings(settings: &CostExplorerSettings) -> Result<Self> {
        let token = std::env::var(&settings.token_env)
            .ok()
            .filter(|t| !t.is_empty());
        Self::new(&settings.endpoint, token, settings.timeout_secs)
    }

    pub fn new(endpoint: &str, token: Option<String>, timeout_secs: u64) -> Result<Self> {
        let endpoint = reqwest::Url::parse(endpoint).map_err(|e| {
            CostwatchError::Config(format!("invalid cost explorer endpoint '{}': {}", endpoint, e))
        })?;
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| CostwatchError::Source(format!("HTTP client error: {}", e)))?;
        Ok(Self {
            http,
            endpoint,
            token,
        })
    }

    /// Fetch one page. `Ok(None)` means the API reported that data for the
    /// period is not available yet.
    fn fetch_page(
        &self,
        range: &DateRange,
        page_token: Option<&str>,
    ) -> Result<Option<GetCostAndUsageResponse>> {
        let body = GetCostAndUsageRequest {
            time_period: TimePeriod {
                start: range.start.format("%Y-%m-%d").to_string(),
                end: range.end.format("%Y-%m-%d").to_string(),
            },
            granularity: "DAILY",
            metrics: [METRIC],
            group_by: [GroupDefinition {
                kind: "DIMENSION",
                key: "SERVICE",
            }],
            next_page_token: page_token,
        };

        let mut request = self
            .http
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, CONTENT_TYPE_JSON)
            .header(TARGET_HEADER, TARGET)
            .json(&body);
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = request
            .send()
            .map_err(|e| CostwatchError::Source(format!("HTTP request failed: {}", e)))?;
        let status = response.status();
        let text = response
            .text()
            .map_err(|e| CostwatchError::Source(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            let err: ApiError = serde_json::from_str(&text).unwrap_or(ApiError {
                kind: String::new(),
                message: text.clone(),
            });
            if err.kind.ends_with("DataUnavailableException") {
                return Ok(None);
            }
            return Err(CostwatchError::Source(format!(
                "cost explorer returned HTTP {}: {} {}",
                status.as_u16(),
                err.kind,
                err.message
            )));
        }

        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| CostwatchError::Parse(format!("invalid cost explorer response: {}", e)))
    }
}

impl BillingSource for CostExplorerClient {
    fn name(&self) -> &str {
        "cost-explorer"
    }

    fn fetch(&self, range: &DateRange) -> Result<Vec<RawCostEntry>> {
        let mut entries = Vec::new();
        let mut page_token: Option<String> = None;

        for page in 1..=MAX_PAGES {
            let response = match self.fetch_page(range, page_token.as_deref())? {
                Some(r) => r,
                None => {
                    tracing::warn!(
                        %range,
                        "cost data not available yet for this period; it usually appears after 24-48 hours"
                    );
                    return Ok(Vec::new());
                }
            };

            flatten_results(response.results_by_time, &mut entries);
            tracing::debug!(page, entries = entries.len(), "fetched cost explorer page");

            match response.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => return Ok(entries),
            }
        }

        Err(CostwatchError::Source(format!(
            "pagination did not finish after {} pages",
            MAX_PAGES
        )))
    }
}

/// One raw entry per (time period, service group)
fn flatten_results(results: Vec<ResultByTime>, out: &mut Vec<RawCostEntry>) {
    for result in results {
        for mut group in result.groups {
            let metric = group.metrics.remove(METRIC);
            let (amount, unit) = match metric {
                Some(m) => (m.amount, m.unit),
                None => (None, None),
            };
            out.push(RawCostEntry {
                date: Some(Value::String(result.time_period.start.clone())),
                service: group.keys.into_iter().next().map(Value::String),
                cost: amount.map(Value::String),
                unit: unit.map(Value::String),
            });
        }
    }
}
