// Process: filtered population totals, four rankings, per-process limits

use super::{by_cpu, by_io, by_memory, by_threads, push_check};
use crate::config::{ProcessConfig, ProcessFilter, ProcessLimits};
use crate::models::{MetricSample, MetricSampleBuilder, ProcessEntry, ProcessState};
use crate::ranking::RankingDimension;
use crate::status::ThresholdCheck;

pub const SERIES: &[&str] = &[
    "process.cpu_total",
    "process.memory_total",
    "process.io_read",
    "process.io_write",
    "process.threads",
    "process.total",
];

pub fn dimensions() -> Vec<RankingDimension<ProcessEntry>> {
    vec![
        RankingDimension::new("cpu", by_cpu),
        RankingDimension::new("memory", by_memory),
        RankingDimension::new("io", by_io),
        RankingDimension::new("threads", by_threads),
    ]
}

impl ProcessFilter {
    pub fn matches(&self, p: &ProcessEntry) -> bool {
        if self.min_cpu_percent.is_some_and(|min| p.cpu_percent < min) {
            return false;
        }
        if self.min_memory_percent.is_some_and(|min| p.memory_percent < min) {
            return false;
        }
        if self.name.as_deref().is_some_and(|name| p.name != name) {
            return false;
        }
        if self
            .user
            .as_deref()
            .is_some_and(|user| p.user.as_deref() != Some(user))
        {
            return false;
        }
        if self.status.is_some_and(|state| p.state != state) {
            return false;
        }
        true
    }
}

/// Keeps discovery order.
pub fn apply_filter(processes: &[ProcessEntry], filter: &ProcessFilter) -> Vec<ProcessEntry> {
    processes
        .iter()
        .filter(|p| filter.matches(p))
        .cloned()
        .collect()
}

pub fn derive(entities: &[ProcessEntry], b: &mut MetricSampleBuilder) {
    let count = |state: ProcessState| entities.iter().filter(|p| p.state == state).count() as u64;

    let io_read = entities
        .iter()
        .map(|p| p.io_read_bytes)
        .fold(0u64, u64::saturating_add);
    let io_write = entities
        .iter()
        .map(|p| p.io_write_bytes)
        .fold(0u64, u64::saturating_add);
    let threads: u64 = entities.iter().map(|p| p.threads as u64).sum();

    b.push_u64("process.total", entities.len() as u64)
        .push_u64("process.running", count(ProcessState::Running))
        .push_u64("process.sleeping", count(ProcessState::Sleeping))
        .push_u64("process.zombie", count(ProcessState::Zombie))
        .push_u64("process.stopped", count(ProcessState::Stopped))
        .push("process.cpu_total", entities.iter().map(|p| p.cpu_percent).sum())
        .push(
            "process.memory_total",
            entities.iter().map(|p| p.memory_percent).sum(),
        )
        .push_u64("process.io_read", io_read)
        .push_u64("process.io_write", io_write)
        .push_u64("process.io_total", io_read.saturating_add(io_write))
        .push_u64("process.threads", threads);
}

/// Population-wide checks, all warning-only.
pub fn checks(sample: &MetricSample, cfg: &ProcessConfig) -> Vec<ThresholdCheck> {
    let levels = [
        ("process.zombie", cfg.zombie_warning),
        ("process.cpu_total", cfg.cpu_total_warning),
        ("process.memory_total", cfg.memory_total_warning),
        ("process.io_total", cfg.io_total_warning_bytes),
        ("process.threads", cfg.threads_total_warning),
    ];
    let mut checks = Vec::with_capacity(levels.len());
    for (field, warning) in levels {
        push_check(&mut checks, sample, field, warning, f64::INFINITY);
    }
    checks
}

/// `pid.<pid>.<metric>` checks; Critical at twice the limit.
pub fn entity_checks(entities: &[ProcessEntry], limits: &ProcessLimits) -> Vec<ThresholdCheck> {
    let mut checks = Vec::new();
    for p in entities {
        let metrics = [
            ("cpu", p.cpu_percent, limits.cpu_percent),
            ("memory", p.memory_percent, limits.memory_percent),
            ("io", p.io_total() as f64, limits.io_bytes),
            ("threads", p.threads as f64, limits.threads),
        ];
        for (metric, value, limit) in metrics {
            if !value.is_finite() {
                continue;
            }
            checks.push(ThresholdCheck::new(
                format!("pid.{}.{}", p.pid, metric),
                value,
                limit,
                limit * 2.0,
            ));
        }
    }
    checks
}
