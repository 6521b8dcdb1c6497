//! Evidence query and snapshot types.

use crate::alert::LabelMap;
use serde::{Deserialize, Serialize};

/// A named PromQL expression evaluated for every job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricQuery {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub query: String,
}

impl MetricQuery {
    pub fn new(name: &str, description: &str, query: String) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            query,
        }
    }
}

/// One time series in a query result. The sample value is kept as text so no
/// precision is lost between Prometheus and the prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSeries {
    #[serde(default, skip_serializing_if = "LabelMap::is_empty")]
    pub labels: LabelMap,
    pub value: String,
}

/// Result of evaluating one [`MetricQuery`] at the anchored query time.
///
/// A failed query still yields a snapshot: only the query identity and
/// `error` are populated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub query: String,
    /// Prometheus result type (`scalar`, `vector`, `matrix`, `string`).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub result_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub series: Vec<MetricSeries>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MetricSnapshot {
    /// Empty snapshot carrying only the query identity.
    pub fn for_query(query: &MetricQuery) -> Self {
        Self {
            name: query.name.clone(),
            description: query.description.clone(),
            query: query.query.clone(),
            ..Default::default()
        }
    }

    /// Snapshot recording a failed query.
    pub fn failed(query: &MetricQuery, error: impl ToString) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::for_query(query)
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Render series as `k=v,k2=v2 => value; ...`, dropping `__name__` and
/// sorting label pairs.
pub fn summarize_series(series: &[MetricSeries]) -> String {
    if series.is_empty() {
        return "no series".to_string();
    }

    series
        .iter()
        .map(|s| {
            let labels: Vec<String> = s
                .labels
                .iter()
                .filter(|(k, _)| k.as_str() != "__name__")
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            if labels.is_empty() {
                s.value.clone()
            } else {
                format!("{} => {}", labels.join(","), s.value)
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(labels: &[(&str, &str)], value: &str) -> MetricSeries {
        MetricSeries {
            labels: labels
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_summarize_empty() {
        assert_eq!(summarize_series(&[]), "no series");
    }

    #[test]
    fn test_summarize_drops_metric_name_and_sorts() {
        let s = vec![
            series(&[("job", "jitter-probe"), ("__name__", "x"), ("instance", "a")], "1.5"),
            series(&[], "2"),
        ];
        assert_eq!(
            summarize_series(&s),
            "instance=a,job=jitter-probe => 1.5; 2"
        );
    }

    #[test]
    fn test_failed_snapshot_keeps_identity_only() {
        let q = MetricQuery::new("dns_timeouts", "DNS timeouts", "increase(x[5m])".to_string());
        let snap = MetricSnapshot::failed(&q, "boom");
        assert_eq!(snap.name, "dns_timeouts");
        assert_eq!(snap.query, "increase(x[5m])");
        assert!(snap.series.is_empty());
        assert!(snap.result_type.is_empty());
        assert_eq!(snap.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_snapshot_serialization_omits_empty_fields() {
        let q = MetricQuery::new("a", "", "up".to_string());
        let json = serde_json::to_value(MetricSnapshot::for_query(&q)).unwrap();
        assert_eq!(json, serde_json::json!({"name": "a", "query": "up"}));
    }
}
