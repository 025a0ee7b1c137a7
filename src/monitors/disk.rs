// Disk: space across partitions, I/O rates, device temperatures

use super::{by_io, percent, push_check};
use crate::config::DiskConfig;
use crate::models::{DiskRaw, MetricSample, MetricSampleBuilder, PartitionRaw, ProcessEntry};
use crate::ranking::RankingDimension;
use crate::status::ThresholdCheck;

pub const SERIES: &[&str] = &[
    "disk.usage_percent",
    "disk.read_bytes_per_sec",
    "disk.write_bytes_per_sec",
    "disk.iops",
    "disk.utilization",
];

const TEMPERATURE_PREFIX: &str = "disk.temperature.";

pub fn dimensions() -> Vec<RankingDimension<ProcessEntry>> {
    vec![RankingDimension::new("io", by_io)]
}

pub fn derive(raw: &DiskRaw, b: &mut MetricSampleBuilder) {
    let sum = |f: fn(&PartitionRaw) -> u64| -> u64 {
        raw.partitions.iter().map(f).fold(0u64, u64::saturating_add)
    };
    let total = sum(|p| p.total);
    let used = sum(|p| p.used);
    let free = sum(|p| p.free);

    b.push_u64("disk.total_space", total)
        .push_u64("disk.used_space", used)
        .push_u64("disk.free_space", free)
        .push("disk.usage_percent", percent(used as f64, total as f64))
        .push_u64("disk.partition_count", raw.partitions.len() as u64);
    for p in &raw.partitions {
        b.push(
            format!("disk.partition.{}.usage_percent", p.mount_point),
            percent(p.used as f64, p.total as f64),
        );
    }

    let read: f64 = raw.devices.iter().map(|d| d.read_bytes_per_sec).sum();
    let write: f64 = raw.devices.iter().map(|d| d.write_bytes_per_sec).sum();
    let iops: f64 = raw
        .devices
        .iter()
        .map(|d| d.reads_per_sec + d.writes_per_sec)
        .sum();
    b.push("disk.read_bytes_per_sec", read)
        .push("disk.write_bytes_per_sec", write)
        .push("disk.iops", iops);
    if !raw.devices.is_empty() {
        let util: f64 = raw.devices.iter().map(|d| d.utilization_percent).sum();
        b.push("disk.utilization", util / raw.devices.len() as f64);
    }

    for t in &raw.temperatures {
        b.push(format!("{}{}", TEMPERATURE_PREFIX, t.device), t.celsius);
    }
}

/// One temperature check per device; a single hot disk escalates the whole monitor.
pub fn checks(sample: &MetricSample, cfg: &DiskConfig) -> Vec<ThresholdCheck> {
    let mut checks = Vec::new();
    push_check(
        &mut checks,
        sample,
        "disk.usage_percent",
        cfg.usage.warning,
        cfg.usage.critical,
    );
    for (name, celsius) in sample.with_prefix(TEMPERATURE_PREFIX) {
        checks.push(ThresholdCheck::new(
            name,
            celsius,
            cfg.temperature.warning,
            cfg.temperature.critical,
        ));
    }
    if let Some(util) = sample.get("disk.utilization") {
        checks.push(ThresholdCheck::warning_only(
            "disk.utilization",
            util,
            cfg.utilization_warning,
        ));
    }
    checks
}
