// Per-monitor derivation: which fields a raw snapshot yields, which of them
// are tracked in history, how entities are ranked and which checks apply.

pub mod cpu;
pub mod disk;
pub mod memory;
pub mod network;
pub mod process;

use crate::config::{AppConfig, CpuConfig, DiskConfig, MemoryConfig, NetworkConfig, ProcessConfig};
use crate::error::ProviderError;
use crate::history::HistoryBuffer;
use crate::models::{MetricSample, MetricSampleBuilder, MonitorKind, ProcessEntry, RawSnapshot};
use crate::ranking::RankingDimension;
use crate::status::ThresholdCheck;

pub(crate) fn percent(part: f64, total: f64) -> f64 {
    if total > 0.0 { part / total * 100.0 } else { 0.0 }
}

pub(crate) fn by_cpu(p: &ProcessEntry) -> f64 {
    p.cpu_percent
}

pub(crate) fn by_memory(p: &ProcessEntry) -> f64 {
    p.memory_percent
}

pub(crate) fn by_io(p: &ProcessEntry) -> f64 {
    p.io_total() as f64
}

pub(crate) fn by_threads(p: &ProcessEntry) -> f64 {
    p.threads as f64
}

/// One monitor's thresholds and options.
#[derive(Debug, Clone)]
pub enum MonitorSettings {
    Cpu(CpuConfig),
    Memory(MemoryConfig),
    Disk(DiskConfig),
    Network(NetworkConfig),
    Process(ProcessConfig),
}

impl MonitorSettings {
    pub fn from_config(config: &AppConfig, kind: MonitorKind) -> Self {
        match kind {
            MonitorKind::Cpu => MonitorSettings::Cpu(config.cpu.clone()),
            MonitorKind::Memory => MonitorSettings::Memory(config.memory.clone()),
            MonitorKind::Disk => MonitorSettings::Disk(config.disk.clone()),
            MonitorKind::Network => MonitorSettings::Network(config.network.clone()),
            MonitorKind::Process => MonitorSettings::Process(config.process.clone()),
        }
    }

    /// Settings with default thresholds.
    pub fn default_for(kind: MonitorKind) -> Self {
        Self::from_config(&AppConfig::default(), kind)
    }

    pub fn kind(&self) -> MonitorKind {
        match self {
            MonitorSettings::Cpu(_) => MonitorKind::Cpu,
            MonitorSettings::Memory(_) => MonitorKind::Memory,
            MonitorSettings::Disk(_) => MonitorKind::Disk,
            MonitorSettings::Network(_) => MonitorKind::Network,
            MonitorSettings::Process(_) => MonitorKind::Process,
        }
    }

    pub fn tracked_series(&self) -> &'static [&'static str] {
        match self {
            MonitorSettings::Cpu(_) => cpu::SERIES,
            MonitorSettings::Memory(_) => memory::SERIES,
            MonitorSettings::Disk(_) => disk::SERIES,
            MonitorSettings::Network(_) => network::SERIES,
            MonitorSettings::Process(_) => process::SERIES,
        }
    }

    pub fn dimensions(&self) -> Vec<RankingDimension<ProcessEntry>> {
        match self {
            MonitorSettings::Cpu(_) => cpu::dimensions(),
            MonitorSettings::Memory(_) => memory::dimensions(),
            MonitorSettings::Disk(_) => disk::dimensions(),
            MonitorSettings::Network(_) => network::dimensions(),
            MonitorSettings::Process(_) => process::dimensions(),
        }
    }

    /// Only the process monitor reports a tree and per-entity alerts.
    pub fn is_hierarchical(&self) -> bool {
        matches!(self, MonitorSettings::Process(_))
    }

    /// Entities to rank and build the tree from.
    pub fn entities(&self, raw: &RawSnapshot) -> Vec<ProcessEntry> {
        match self {
            MonitorSettings::Process(cfg) => process::apply_filter(raw.processes(), &cfg.filter),
            _ => raw.processes().to_vec(),
        }
    }

    /// Pushes every derived field for this tick. `history` is read, never written.
    pub fn derive(
        &self,
        raw: &RawSnapshot,
        entities: &[ProcessEntry],
        history: &HistoryBuffer,
        b: &mut MetricSampleBuilder,
    ) -> Result<(), ProviderError> {
        match (self, raw) {
            (MonitorSettings::Cpu(_), RawSnapshot::Cpu(r)) => cpu::derive(r, b),
            (MonitorSettings::Memory(cfg), RawSnapshot::Memory(r)) => {
                memory::derive(r, cfg, history, b)
            }
            (MonitorSettings::Disk(_), RawSnapshot::Disk(r)) => disk::derive(r, b),
            (MonitorSettings::Network(_), RawSnapshot::Network(r)) => network::derive(r, b),
            (MonitorSettings::Process(_), RawSnapshot::Process(_)) => process::derive(entities, b),
            _ => {
                return Err(ProviderError::UnexpectedSnapshot {
                    expected: self.kind(),
                    got: raw.kind(),
                });
            }
        }
        Ok(())
    }

    pub fn checks(&self, sample: &MetricSample) -> Vec<ThresholdCheck> {
        match self {
            MonitorSettings::Cpu(cfg) => cpu::checks(sample, cfg),
            MonitorSettings::Memory(cfg) => memory::checks(sample, cfg),
            MonitorSettings::Disk(cfg) => disk::checks(sample, cfg),
            MonitorSettings::Network(cfg) => network::checks(sample, cfg),
            MonitorSettings::Process(cfg) => process::checks(sample, cfg),
        }
    }

    pub fn entity_checks(&self, entities: &[ProcessEntry]) -> Option<Vec<ThresholdCheck>> {
        match self {
            MonitorSettings::Process(cfg) => Some(process::entity_checks(entities, &cfg.limits)),
            _ => None,
        }
    }
}

/// Adds a check only when the sample carries the field; rejected fields raise nothing.
pub(crate) fn push_check(
    checks: &mut Vec<ThresholdCheck>,
    sample: &MetricSample,
    field: &str,
    warning: f64,
    critical: f64,
) {
    if let Some(value) = sample.get(field) {
        checks.push(ThresholdCheck::new(field, value, warning, critical));
    }
}
