//! Alert-group webhook data model.
//!
//! Mirrors the JSON body a Grafana (or Alertmanager-compatible) contact point
//! posts to `POST /alerts/grafana`. Label and annotation maps are ordered so
//! that everything derived from a payload (prompts, stored records) renders
//! deterministically.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Ordered string map used for labels and annotations.
pub type LabelMap = BTreeMap<String, String>;

/// One webhook notification batching related alerts under shared labels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertGroupPayload {
    #[serde(default)]
    pub receiver: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub alerts: Vec<Alert>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub group_labels: LabelMap,
    #[serde(default, deserialize_with = "null_as_default")]
    pub common_labels: LabelMap,
    #[serde(default, deserialize_with = "null_as_default")]
    pub common_annotations: LabelMap,
    #[serde(default, rename = "externalURL")]
    pub external_url: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub group_key: String,
    #[serde(default)]
    pub truncated_alerts: u32,
}

/// A single alert inside a group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: LabelMap,
    #[serde(default, deserialize_with = "null_as_default")]
    pub annotations: LabelMap,
    /// Absent when the sender used the zero timestamp.
    #[serde(default, deserialize_with = "zero_time_as_none")]
    pub starts_at: Option<DateTime<Utc>>,
    /// Absent while the alert is still firing.
    #[serde(default, deserialize_with = "zero_time_as_none")]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default, rename = "generatorURL")]
    pub generator_url: String,
    #[serde(default)]
    pub fingerprint: String,
    #[serde(default, rename = "silenceURL")]
    pub silence_url: String,
    #[serde(default, rename = "dashboardURL")]
    pub dashboard_url: String,
    #[serde(default, rename = "panelURL")]
    pub panel_url: String,
}

/// The subset of an alert carried into prompts and stored records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertSummary {
    pub status: String,
    pub labels: LabelMap,
    pub annotations: LabelMap,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
}

impl From<&Alert> for AlertSummary {
    fn from(alert: &Alert) -> Self {
        Self {
            status: alert.status.clone(),
            labels: alert.labels.clone(),
            annotations: alert.annotations.clone(),
            starts_at: alert.starts_at,
            ends_at: alert.ends_at,
        }
    }
}

impl AlertGroupPayload {
    /// Summaries of every alert, in payload order.
    pub fn summarize_alerts(&self) -> Vec<AlertSummary> {
        self.alerts.iter().map(AlertSummary::from).collect()
    }

    /// Earliest non-zero `startsAt` across the group, if any alert has one.
    pub fn earliest_start(&self) -> Option<DateTime<Utc>> {
        self.alerts.iter().filter_map(|a| a.starts_at).min()
    }
}

/// Treat JSON `null` the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Senders encode "no timestamp" as `0001-01-01T00:00:00Z`.
fn zero_time_as_none<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<DateTime<Utc>>::deserialize(deserializer)?;
    Ok(value.filter(|ts| ts.year() > 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn sample_payload() -> serde_json::Value {
        json!({
            "receiver": "edge-analysis",
            "status": "firing",
            "groupKey": "{}:{alertname=\"WanDown\"}",
            "groupLabels": {"alertname": "WanDown"},
            "commonLabels": {"alertname": "WanDown", "severity": "critical"},
            "commonAnnotations": {"summary": "WAN unreachable"},
            "externalURL": "http://grafana:3000",
            "version": "1",
            "truncatedAlerts": 0,
            "alerts": [
                {
                    "status": "firing",
                    "labels": {"alertname": "WanDown", "instance": "gw-1"},
                    "annotations": {"summary": "WAN unreachable"},
                    "startsAt": "2024-05-01T10:00:05Z",
                    "endsAt": "0001-01-01T00:00:00Z",
                    "fingerprint": "abc123"
                },
                {
                    "status": "firing",
                    "labels": {"alertname": "WanDown", "instance": "gw-2"},
                    "annotations": {},
                    "startsAt": "2024-05-01T10:00:00Z",
                    "endsAt": "0001-01-01T00:00:00Z"
                }
            ]
        })
    }

    #[test]
    fn test_deserialize_grafana_payload() {
        let payload: AlertGroupPayload = serde_json::from_value(sample_payload()).unwrap();

        assert_eq!(payload.receiver, "edge-analysis");
        assert_eq!(payload.status, "firing");
        assert_eq!(payload.alerts.len(), 2);
        assert_eq!(payload.external_url, "http://grafana:3000");
        assert_eq!(payload.common_labels.get("severity").unwrap(), "critical");
        assert_eq!(payload.alerts[0].fingerprint, "abc123");
    }

    #[test]
    fn test_zero_end_time_is_still_firing() {
        let payload: AlertGroupPayload = serde_json::from_value(sample_payload()).unwrap();
        assert!(payload.alerts[0].ends_at.is_none());
        assert!(payload.alerts[0].starts_at.is_some());
    }

    #[test]
    fn test_null_maps_become_empty() {
        let payload: AlertGroupPayload = serde_json::from_value(json!({
            "status": "resolved",
            "commonLabels": null,
            "alerts": [{"status": "resolved", "labels": null}]
        }))
        .unwrap();

        assert!(payload.common_labels.is_empty());
        assert!(payload.alerts[0].labels.is_empty());
        assert!(payload.alerts[0].starts_at.is_none());
    }

    #[test]
    fn test_earliest_start_picks_minimum() {
        let payload: AlertGroupPayload = serde_json::from_value(sample_payload()).unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        assert_eq!(payload.earliest_start(), Some(expected));
    }

    #[test]
    fn test_earliest_start_ignores_zero_times() {
        let payload: AlertGroupPayload = serde_json::from_value(json!({
            "alerts": [
                {"startsAt": "0001-01-01T00:00:00Z"},
                {}
            ]
        }))
        .unwrap();
        assert_eq!(payload.earliest_start(), None);
    }

    #[test]
    fn test_summaries_preserve_order() {
        let payload: AlertGroupPayload = serde_json::from_value(sample_payload()).unwrap();
        let summaries = payload.summarize_alerts();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].labels.get("instance").unwrap(), "gw-1");
        assert_eq!(summaries[1].labels.get("instance").unwrap(), "gw-2");
    }
}
