// Network: interface totals, throughput, bandwidth share, probe latency and loss

use super::{by_cpu, percent};
use crate::config::NetworkConfig;
use crate::models::{InterfaceRaw, MetricSample, MetricSampleBuilder, NetworkRaw, ProcessEntry};
use crate::ranking::RankingDimension;
use crate::status::ThresholdCheck;

pub const SERIES: &[&str] = &[
    "network.send_rate",
    "network.recv_rate",
    "network.throughput",
    "network.latency_avg",
    "network.bandwidth_utilization",
];

/// Per-target round trip in ms, e.g. `network.latency.1.1.1.1:53`.
pub const LATENCY_PREFIX: &str = "network.latency.";
/// Per-target loss, 0 or 100 for a single connect probe.
pub const LOSS_PREFIX: &str = "network.packet_loss.";

pub fn dimensions() -> Vec<RankingDimension<ProcessEntry>> {
    vec![RankingDimension::new("cpu", by_cpu)]
}

pub fn derive(raw: &NetworkRaw, b: &mut MetricSampleBuilder) {
    let ifaces = &raw.interfaces;
    let sum = |f: fn(&InterfaceRaw) -> u64| -> u64 {
        ifaces.iter().map(f).fold(0u64, u64::saturating_add)
    };

    let send_rate: f64 = ifaces.iter().map(|i| i.sent_bytes_per_sec).sum();
    let recv_rate: f64 = ifaces.iter().map(|i| i.recv_bytes_per_sec).sum();
    let throughput = send_rate + recv_rate;

    b.push_u64("network.bytes_sent", sum(|i| i.bytes_sent))
        .push_u64("network.bytes_recv", sum(|i| i.bytes_recv))
        .push_u64("network.packets_sent", sum(|i| i.packets_sent))
        .push_u64("network.packets_recv", sum(|i| i.packets_recv))
        .push_u64("network.errors", sum(|i| i.errors_in.saturating_add(i.errors_out)))
        .push_u64("network.drops", sum(|i| i.drops_in.saturating_add(i.drops_out)))
        .push("network.send_rate", send_rate)
        .push("network.recv_rate", recv_rate)
        .push("network.throughput", throughput)
        .push_u64("network.interface_count", ifaces.len() as u64);

    let speed_bits = sum(|i| i.speed_bits);
    if speed_bits > 0 {
        b.push(
            "network.bandwidth_utilization",
            percent(throughput * 8.0, speed_bits as f64),
        );
    }

    if !raw.latency.is_empty() {
        for probe in &raw.latency {
            b.push_opt(format!("{}{}", LATENCY_PREFIX, probe.target), probe.latency_ms);
            let lost = if probe.latency_ms.is_some() { 0.0 } else { 100.0 };
            b.push(format!("{}{}", LOSS_PREFIX, probe.target), lost);
        }
        let ok: Vec<f64> = raw.latency.iter().filter_map(|p| p.latency_ms).collect();
        if !ok.is_empty() {
            b.push("network.latency_avg", ok.iter().sum::<f64>() / ok.len() as f64);
        }
        let failed = raw.latency.len() - ok.len();
        b.push(
            "network.packet_loss",
            percent(failed as f64, raw.latency.len() as f64),
        );
    }

    if let Some(count) = raw.connection_count {
        b.push_u64("network.connections", count);
    }
}

pub fn checks(sample: &MetricSample, cfg: &NetworkConfig) -> Vec<ThresholdCheck> {
    let mut checks = Vec::new();
    for (name, latency) in sample.with_prefix(LATENCY_PREFIX) {
        checks.push(ThresholdCheck::new(
            name,
            latency,
            cfg.latency_ms.warning,
            cfg.latency_ms.critical,
        ));
    }
    for (name, loss) in sample.with_prefix(LOSS_PREFIX) {
        checks.push(ThresholdCheck::warning_only(name, loss, cfg.packet_loss_warning));
    }
    if let Some(util) = sample.get("network.bandwidth_utilization") {
        checks.push(ThresholdCheck::warning_only(
            "network.bandwidth_utilization",
            util,
            cfg.bandwidth_warning,
        ));
    }
    if cfg.alert_no_connections
        && let Some(count) = sample.get("network.connections")
    {
        checks.push(ThresholdCheck::flag("network.connections", count == 0.0));
    }
    checks
}
