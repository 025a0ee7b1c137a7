// Memory: usage ratios, cache share, swap, leak trend

use super::{by_memory, percent, push_check};
use crate::config::MemoryConfig;
use crate::history::HistoryBuffer;
use crate::models::{MemoryRaw, MetricSample, MetricSampleBuilder, ProcessEntry};
use crate::ranking::RankingDimension;
use crate::status::ThresholdCheck;

pub const SERIES: &[&str] = &[
    "memory.percent",
    "memory.cache_percent",
    "memory.swap_percent",
];

pub const LEAK_FIELD: &str = "memory.leak_suspected";

pub fn dimensions() -> Vec<RankingDimension<ProcessEntry>> {
    vec![RankingDimension::new("memory", by_memory)]
}

/// The leak trend looks at history as it stood before this tick.
pub fn derive(
    raw: &MemoryRaw,
    cfg: &MemoryConfig,
    history: &HistoryBuffer,
    b: &mut MetricSampleBuilder,
) {
    let total = raw.total as f64;
    let cache_total = raw.buffers.saturating_add(raw.cached).saturating_add(raw.shared);

    b.push_u64("memory.total", raw.total)
        .push_u64("memory.available", raw.available)
        .push_u64("memory.used", raw.used)
        .push_u64("memory.free", raw.free)
        .push_u64("memory.cached", raw.cached)
        .push_u64("memory.buffers", raw.buffers)
        .push_u64("memory.shared", raw.shared)
        .push_u64("memory.cache_total", cache_total)
        .push_u64("memory.swap_total", raw.swap_total)
        .push_u64("memory.swap_used", raw.swap_used)
        .push_u64("memory.swap_free", raw.swap_free)
        .push("memory.percent", percent(raw.used as f64, total))
        .push("memory.available_percent", percent(raw.available as f64, total))
        .push("memory.cache_percent", percent(cache_total as f64, total))
        .push(
            "memory.swap_percent",
            percent(raw.swap_used as f64, raw.swap_total as f64),
        );

    if cfg.leak_detection {
        let rising = history
            .series_for("memory.percent")
            .map(|s| s.is_strictly_increasing(cfg.leak_window))
            .unwrap_or(false);
        b.push(LEAK_FIELD, if rising { 1.0 } else { 0.0 });
    }
}

pub fn checks(sample: &MetricSample, cfg: &MemoryConfig) -> Vec<ThresholdCheck> {
    let mut checks = Vec::new();
    push_check(&mut checks, sample, "memory.percent", cfg.usage.warning, cfg.usage.critical);
    push_check(
        &mut checks,
        sample,
        "memory.swap_percent",
        cfg.swap.warning,
        cfg.swap.critical,
    );
    if let Some(leak) = sample.get(LEAK_FIELD) {
        checks.push(ThresholdCheck::flag("memory.leak", leak > 0.0));
    }
    checks
}
