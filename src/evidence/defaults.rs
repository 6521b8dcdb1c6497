//! Built-in evidence queries used when none are configured.
//!
//! Covers the probe exporters deployed alongside the receiver (gateway,
//! WiFi, jitter and DNS probes) plus node-exporter link-layer counters.

use super::types::MetricQuery;
use std::time::Duration;

const UPLINK_DEVICES: &str = r#"device=~"eth0|wlan0|en0""#;

/// Render a duration in PromQL range notation: whole hours as `h`, whole
/// minutes as `m`, seconds otherwise.
pub fn prom_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs > 0 && secs % 3600 == 0 {
        format!("{}h", secs / 3600)
    } else if secs > 0 && secs % 60 == 0 {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}

/// The default query set, with every range selector sized to `lookback`.
pub fn default_queries(lookback: Duration) -> Vec<MetricQuery> {
    let lb = prom_duration(lookback);
    let node = |metric: &str| {
        format!(
            r#"rate({}{{job="node-exporter",{}}}[{}])"#,
            metric, UPLINK_DEVICES, lb
        )
    };

    vec![
        MetricQuery::new(
            "gateway_reachable_avg",
            "Average gateway reachability over the lookback window",
            format!(r#"avg_over_time(gateway_reachable{{job="gateway-monitor"}}[{}])"#, lb),
        ),
        MetricQuery::new(
            "wan_reachable_avg",
            "Average WAN reachability over the lookback window",
            format!(r#"avg_over_time(wan_reachable{{job="gateway-monitor"}}[{}])"#, lb),
        ),
        MetricQuery::new(
            "wifi_probe_up_avg",
            "Average WiFi probe success over the lookback window",
            format!(r#"avg_over_time(wifi_probe_up{{job="wifi-probe"}}[{}])"#, lb),
        ),
        MetricQuery::new(
            "wifi_probe_errors",
            "WiFi probe errors accumulated over the lookback window",
            format!(r#"increase(wifi_probe_errors_total{{job="wifi-probe"}}[{}])"#, lb),
        ),
        MetricQuery::new(
            "jitter_avg_ms",
            "Average jitter in milliseconds over the lookback window",
            format!(r#"avg_over_time(network_jitter_ms{{job="jitter-probe"}}[{}])"#, lb),
        ),
        MetricQuery::new(
            "jitter_max_ms",
            "Worst jitter in milliseconds over the lookback window",
            format!(r#"max_over_time(network_jitter_ms{{job="jitter-probe"}}[{}])"#, lb),
        ),
        MetricQuery::new(
            "latency_p99_avg_ms",
            "Average p99 latency over the lookback window",
            format!(r#"avg_over_time(latency_p99{{job="jitter-probe"}}[{}])"#, lb),
        ),
        MetricQuery::new(
            "latency_p99_max_ms",
            "Worst p99 latency over the lookback window",
            format!(r#"max_over_time(latency_p99{{job="jitter-probe"}}[{}])"#, lb),
        ),
        MetricQuery::new(
            "packet_loss_total",
            "Packet loss accumulated over the lookback window",
            format!(r#"increase(packet_loss_total{{job="jitter-probe"}}[{}])"#, lb),
        ),
        MetricQuery::new(
            "packet_loss_bursts",
            "Packet loss bursts accumulated over the lookback window",
            format!(r#"increase(packet_loss_burst_total{{job="jitter-probe"}}[{}])"#, lb),
        ),
        MetricQuery::new(
            "dns_timeouts",
            "DNS timeouts accumulated over the lookback window",
            format!(r#"increase(dns_probe_timeouts_total{{job="dns-probe"}}[{}])"#, lb),
        ),
        MetricQuery::new(
            "dns_latency_avg_seconds",
            "Average DNS latency over the lookback window",
            format!(r#"avg_over_time(dns_probe_latency_seconds{{job="dns-probe"}}[{}])"#, lb),
        ),
        MetricQuery::new(
            "failure_domain_events",
            "Gateway monitor domain transitions over the lookback window",
            format!(r#"increase(failure_domain_events_total{{job="gateway-monitor"}}[{}])"#, lb),
        ),
        MetricQuery::new(
            "carrier_changes",
            "Host carrier changes on likely uplink devices",
            format!(
                r#"increase(node_network_carrier_changes_total{{job="node-exporter",{}}}[{}])"#,
                UPLINK_DEVICES, lb
            ),
        ),
        MetricQuery::new(
            "link_drops",
            "Receive and transmit drops on likely uplink devices",
            format!(
                "{} + {}",
                node("node_network_receive_drop_total"),
                node("node_network_transmit_drop_total")
            ),
        ),
        MetricQuery::new(
            "link_errors",
            "Receive and transmit errors on likely uplink devices",
            format!(
                "{} + {}",
                node("node_network_receive_errs_total"),
                node("node_network_transmit_errs_total")
            ),
        ),
        MetricQuery::new(
            "tcp_retransmits",
            "TCP retransmit rate from node-exporter",
            format!(r#"rate(node_netstat_Tcp_RetransSegs{{job="node-exporter"}}[{}])"#, lb),
        ),
        MetricQuery::new(
            "softnet_squeezed",
            "Softnet times squeezed rate",
            format!(
                r#"sum(rate(node_softnet_times_squeezed_total{{job="node-exporter"}}[{}]))"#,
                lb
            ),
        ),
        MetricQuery::new(
            "softnet_dropped",
            "Softnet drop rate",
            format!(r#"sum(rate(node_softnet_dropped_total{{job="node-exporter"}}[{}]))"#, lb),
        ),
        MetricQuery::new(
            "uplink_rx_bps",
            "Receive throughput on likely uplink devices",
            node("node_network_receive_bytes_total"),
        ),
        MetricQuery::new(
            "uplink_tx_bps",
            "Transmit throughput on likely uplink devices",
            node("node_network_transmit_bytes_total"),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_prom_duration_units() {
        assert_eq!(prom_duration(Duration::from_secs(3600)), "1h");
        assert_eq!(prom_duration(Duration::from_secs(7200)), "2h");
        assert_eq!(prom_duration(Duration::from_secs(1800)), "30m");
        assert_eq!(prom_duration(Duration::from_secs(90)), "90s");
        assert_eq!(prom_duration(Duration::from_secs(0)), "0s");
    }

    #[test]
    fn test_default_queries_use_lookback() {
        let queries = default_queries(Duration::from_secs(1800));
        assert_eq!(queries.len(), 21);
        assert!(queries.iter().all(|q| q.query.contains("[30m]")));
    }

    #[test]
    fn test_default_queries_cover_signal_families() {
        let names: HashSet<String> = default_queries(Duration::from_secs(600))
            .into_iter()
            .map(|q| q.name)
            .collect();
        for expected in [
            "wan_reachable_avg",
            "dns_timeouts",
            "jitter_avg_ms",
            "packet_loss_total",
            "carrier_changes",
        ] {
            assert!(names.contains(expected), "missing {}", expected);
        }
    }

    #[test]
    fn test_link_queries_sum_both_directions() {
        let queries = default_queries(Duration::from_secs(300));
        let drops = queries.iter().find(|q| q.name == "link_drops").unwrap();
        assert_eq!(
            drops.query,
            r#"rate(node_network_receive_drop_total{job="node-exporter",device=~"eth0|wlan0|en0"}[5m]) + rate(node_network_transmit_drop_total{job="node-exporter",device=~"eth0|wlan0|en0"}[5m])"#
        );
    }
}
