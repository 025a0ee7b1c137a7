// CPU: overall and per-core usage, time shares, load, temperature

use super::{by_cpu, percent, push_check};
use crate::config::CpuConfig;
use crate::models::{CpuRaw, MetricSample, MetricSampleBuilder, ProcessEntry};
use crate::ranking::RankingDimension;
use crate::status::ThresholdCheck;

pub const SERIES: &[&str] = &[
    "cpu.usage",
    "cpu.user",
    "cpu.system",
    "cpu.idle",
    "cpu.temperature",
];

pub fn dimensions() -> Vec<RankingDimension<ProcessEntry>> {
    vec![RankingDimension::new("cpu", by_cpu)]
}

pub fn derive(raw: &CpuRaw, b: &mut MetricSampleBuilder) {
    b.push("cpu.usage", raw.usage_percent);

    match raw.times {
        Some(t) if t.total() > 0.0 => {
            let total = t.total();
            b.push("cpu.user", percent(t.user, total))
                .push("cpu.system", percent(t.system, total))
                .push("cpu.idle", percent(t.idle, total))
                .push("cpu.iowait", percent(t.iowait, total));
        }
        // no idle without a valid usage
        _ if raw.usage_percent.is_finite() => {
            b.push("cpu.idle", (100.0 - raw.usage_percent).max(0.0));
        }
        _ => {}
    }

    let cores = &raw.per_core_percent;
    b.push_u64("cpu.core_count", cores.len() as u64);
    if !cores.is_empty() {
        let sum: f64 = cores.iter().sum();
        b.push("cpu.core_avg", sum / cores.len() as f64);
        b.push("cpu.core_max", cores.iter().copied().fold(f64::MIN, f64::max));
        for (i, usage) in cores.iter().enumerate() {
            b.push(format!("cpu.core.{}", i), *usage);
        }
    }

    let freqs: Vec<u64> = raw
        .core_frequencies_mhz
        .iter()
        .copied()
        .filter(|f| *f > 0)
        .collect();
    if !freqs.is_empty() {
        let avg = freqs.iter().sum::<u64>() as f64 / freqs.len() as f64;
        b.push("cpu.frequency_avg_mhz", avg);
    }

    b.push("cpu.load_1", raw.load_average.one)
        .push("cpu.load_5", raw.load_average.five)
        .push("cpu.load_15", raw.load_average.fifteen)
        .push_opt("cpu.temperature", raw.temperature_celsius);
}

pub fn checks(sample: &MetricSample, cfg: &CpuConfig) -> Vec<ThresholdCheck> {
    let mut checks = Vec::new();
    push_check(&mut checks, sample, "cpu.usage", cfg.usage.warning, cfg.usage.critical);
    push_check(&mut checks, sample, "cpu.core_max", cfg.core.warning, cfg.core.critical);
    push_check(
        &mut checks,
        sample,
        "cpu.temperature",
        cfg.temperature.warning,
        cfg.temperature.critical,
    );
    checks
}
