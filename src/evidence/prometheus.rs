//! Prometheus HTTP API client for instant queries.

use super::types::{summarize_series, MetricQuery, MetricSeries, MetricSnapshot};
use super::{EvidenceError, EvidenceSource};
use crate::alert::LabelMap;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Executes `GET /api/v1/query` against a Prometheus-compatible server.
pub struct PrometheusClient {
    /// Base URL without trailing slash (e.g., "http://prometheus:9090")
    base_url: String,
    client: Client,
    timeout: Duration,
}

impl PrometheusClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, EvidenceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EvidenceError::Network(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn map_send_error(&self, e: reqwest::Error) -> EvidenceError {
        if e.is_timeout() {
            EvidenceError::Timeout(self.timeout.as_millis() as u64)
        } else {
            EvidenceError::Network(e.to_string())
        }
    }
}

/// Query API response envelope. `result` stays raw until `resultType` is known.
#[derive(Deserialize)]
struct QueryResponse {
    status: String,
    #[serde(default)]
    data: Option<QueryData>,
    #[serde(default, rename = "errorType")]
    error_type: String,
    #[serde(default)]
    error: String,
}

#[derive(Deserialize)]
struct QueryData {
    #[serde(rename = "resultType")]
    result_type: String,
    #[serde(default)]
    result: Value,
}

#[derive(Deserialize)]
struct VectorEntry {
    #[serde(default)]
    metric: LabelMap,
    #[serde(default)]
    value: Vec<Value>,
}

/// Sample values arrive as `[<unix ts>, "<value>"]`.
fn sample_text(sample: &[Value]) -> Option<String> {
    match sample {
        [_, Value::String(s)] => Some(s.clone()),
        [_, other] => Some(other.to_string()),
        _ => None,
    }
}

/// Translate a decoded query result into a snapshot.
pub(crate) fn snapshot_from_result(
    query: &MetricQuery,
    result_type: &str,
    result: Value,
) -> Result<MetricSnapshot, EvidenceError> {
    let mut snapshot = MetricSnapshot::for_query(query);
    snapshot.result_type = result_type.to_string();

    match result_type {
        "scalar" => {
            let sample: Vec<Value> = serde_json::from_value(result)
                .map_err(|e| EvidenceError::Decode(format!("scalar result: {}", e)))?;
            if let Some(value) = sample_text(&sample) {
                snapshot.summary = format!("value={}", value);
                snapshot.series = vec![MetricSeries {
                    labels: LabelMap::new(),
                    value,
                }];
            }
        }
        "vector" => {
            let entries: Vec<VectorEntry> = serde_json::from_value(result)
                .map_err(|e| EvidenceError::Decode(format!("vector result: {}", e)))?;
            snapshot.series = entries
                .into_iter()
                .map(|entry| MetricSeries {
                    value: sample_text(&entry.value).unwrap_or_default(),
                    labels: entry.metric,
                })
                .collect();
            snapshot.summary = summarize_series(&snapshot.series);
        }
        _ => {
            snapshot.summary = result.to_string();
        }
    }

    Ok(snapshot)
}

#[async_trait]
impl EvidenceSource for PrometheusClient {
    async fn instant_query(
        &self,
        query: &MetricQuery,
        at: DateTime<Utc>,
    ) -> Result<MetricSnapshot, EvidenceError> {
        let url = format!("{}/api/v1/query", self.base_url);
        let time = at.to_rfc3339_opts(SecondsFormat::Secs, true);

        let response = self
            .client
            .get(&url)
            .query(&[("query", query.query.as_str()), ("time", time.as_str())])
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !status.is_success() {
            return Err(EvidenceError::Upstream {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        let envelope: QueryResponse =
            serde_json::from_str(&body).map_err(|e| EvidenceError::Decode(e.to_string()))?;

        if envelope.status != "success" {
            return Err(EvidenceError::Query {
                error_type: envelope.error_type,
                error: envelope.error,
            });
        }

        let data = envelope
            .data
            .ok_or_else(|| EvidenceError::Decode("missing data field".to_string()))?;

        snapshot_from_result(query, &data.result_type, data.result)
    }
}
