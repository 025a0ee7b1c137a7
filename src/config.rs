use serde::{Deserialize, Serialize};

use crate::models::{MonitorKind, ProcessState};

const MIB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
    #[serde(default)]
    pub cpu: CpuConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub disk: DiskConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub process: ProcessConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_host() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    8081
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Points retained per series.
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    /// Entries per ranking dimension unless a monitor overrides it.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default = "default_max_tree_depth")]
    pub max_tree_depth: usize,
    /// How often each worker logs its tick counters at INFO level.
    #[serde(default = "default_stats_log_interval_secs")]
    pub stats_log_interval_secs: u64,
    /// host:port pairs probed with a TCP connect for latency and packet loss.
    #[serde(default = "default_latency_targets")]
    pub latency_targets: Vec<String>,
    #[serde(default = "default_latency_timeout_ms")]
    pub latency_timeout_ms: u64,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            history_capacity: default_history_capacity(),
            top_n: default_top_n(),
            max_tree_depth: default_max_tree_depth(),
            stats_log_interval_secs: default_stats_log_interval_secs(),
            latency_targets: default_latency_targets(),
            latency_timeout_ms: default_latency_timeout_ms(),
        }
    }
}

fn default_tick_interval_ms() -> u64 {
    1000
}

fn default_history_capacity() -> usize {
    crate::history::DEFAULT_HISTORY_CAPACITY
}

fn default_top_n() -> usize {
    10
}

fn default_max_tree_depth() -> usize {
    5
}

fn default_stats_log_interval_secs() -> u64 {
    60
}

fn default_latency_targets() -> Vec<String> {
    vec!["8.8.8.8:53".into(), "1.1.1.1:53".into()]
}

fn default_latency_timeout_ms() -> u64 {
    1000
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub warning: f64,
    pub critical: f64,
}

impl Threshold {
    pub const fn new(warning: f64, critical: f64) -> Self {
        Self { warning, critical }
    }

    pub fn is_misconfigured(&self) -> bool {
        self.warning > self.critical
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CpuConfig {
    pub enabled: bool,
    pub top_n: Option<usize>,
    pub usage: Threshold,
    /// Applied to the busiest core.
    pub core: Threshold,
    pub temperature: Threshold,
}

impl Default for CpuConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            top_n: None,
            usage: Threshold::new(75.0, 90.0),
            core: Threshold::new(75.0, 90.0),
            temperature: Threshold::new(70.0, 85.0),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    pub enabled: bool,
    pub top_n: Option<usize>,
    pub usage: Threshold,
    /// Swap status per level. A swap Warning also raises the monitor to Warning,
    /// since the overall status is always the highest active flag.
    pub swap: Threshold,
    /// Flags a suspected leak when usage rose on each of the last `leak_window` samples.
    pub leak_detection: bool,
    pub leak_window: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            top_n: None,
            usage: Threshold::new(70.0, 85.0),
            swap: Threshold::new(50.0, 80.0),
            leak_detection: true,
            leak_window: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiskConfig {
    pub enabled: bool,
    pub top_n: Option<usize>,
    pub usage: Threshold,
    pub temperature: Threshold,
    pub utilization_warning: f64,
}

impl Default for DiskConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            top_n: None,
            usage: Threshold::new(80.0, 90.0),
            temperature: Threshold::new(50.0, 60.0),
            utilization_warning: 80.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub enabled: bool,
    pub top_n: Option<usize>,
    pub latency_ms: Threshold,
    pub packet_loss_warning: f64,
    pub bandwidth_warning: f64,
    pub alert_no_connections: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            top_n: None,
            latency_ms: Threshold::new(100.0, 200.0),
            packet_loss_warning: 5.0,
            bandwidth_warning: 80.0,
            alert_no_connections: true,
        }
    }
}

/// Per-process limits. Each fires Warning at the limit and Critical at twice the limit.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProcessLimits {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub io_bytes: f64,
    pub threads: f64,
}

impl Default for ProcessLimits {
    fn default() -> Self {
        Self {
            cpu_percent: 80.0,
            memory_percent: 80.0,
            io_bytes: 100.0 * MIB,
            threads: 100.0,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProcessFilter {
    pub min_cpu_percent: Option<f64>,
    pub min_memory_percent: Option<f64>,
    /// Exact process name.
    pub name: Option<String>,
    /// Exact owner name; processes with an unknown owner never match.
    pub user: Option<String>,
    pub status: Option<ProcessState>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProcessConfig {
    pub enabled: bool,
    pub top_n: Option<usize>,
    pub zombie_warning: f64,
    pub cpu_total_warning: f64,
    pub memory_total_warning: f64,
    pub io_total_warning_bytes: f64,
    pub threads_total_warning: f64,
    pub limits: ProcessLimits,
    pub filter: ProcessFilter,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            top_n: None,
            zombie_warning: 5.0,
            cpu_total_warning: 80.0,
            memory_total_warning: 80.0,
            io_total_warning_bytes: 100.0 * MIB,
            threads_total_warning: 4096.0,
            limits: ProcessLimits::default(),
            filter: ProcessFilter::default(),
        }
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        config.warn_misconfigured();
        Ok(config)
    }

    pub fn is_enabled(&self, kind: MonitorKind) -> bool {
        match kind {
            MonitorKind::Cpu => self.cpu.enabled,
            MonitorKind::Memory => self.memory.enabled,
            MonitorKind::Disk => self.disk.enabled,
            MonitorKind::Network => self.network.enabled,
            MonitorKind::Process => self.process.enabled,
        }
    }

    pub fn enabled_monitors(&self) -> Vec<MonitorKind> {
        MonitorKind::ALL
            .into_iter()
            .filter(|k| self.is_enabled(*k))
            .collect()
    }

    /// Ranking size for one monitor, falling back to `monitoring.top_n`.
    pub fn top_n_for(&self, kind: MonitorKind) -> usize {
        let over = match kind {
            MonitorKind::Cpu => self.cpu.top_n,
            MonitorKind::Memory => self.memory.top_n,
            MonitorKind::Disk => self.disk.top_n,
            MonitorKind::Network => self.network.top_n,
            MonitorKind::Process => self.process.top_n,
        };
        over.unwrap_or(self.monitoring.top_n)
    }

    fn thresholds(&self) -> [(&'static str, Threshold); 8] {
        [
            ("cpu.usage", self.cpu.usage),
            ("cpu.core", self.cpu.core),
            ("cpu.temperature", self.cpu.temperature),
            ("memory.usage", self.memory.usage),
            ("memory.swap", self.memory.swap),
            ("disk.usage", self.disk.usage),
            ("disk.temperature", self.disk.temperature),
            ("network.latency_ms", self.network.latency_ms),
        ]
    }

    fn warning_levels(&self) -> [(&'static str, f64); 12] {
        let p = &self.process;
        [
            ("disk.utilization_warning", self.disk.utilization_warning),
            ("network.packet_loss_warning", self.network.packet_loss_warning),
            ("network.bandwidth_warning", self.network.bandwidth_warning),
            ("process.zombie_warning", p.zombie_warning),
            ("process.cpu_total_warning", p.cpu_total_warning),
            ("process.memory_total_warning", p.memory_total_warning),
            ("process.io_total_warning_bytes", p.io_total_warning_bytes),
            ("process.threads_total_warning", p.threads_total_warning),
            ("process.limits.cpu_percent", p.limits.cpu_percent),
            ("process.limits.memory_percent", p.limits.memory_percent),
            ("process.limits.io_bytes", p.limits.io_bytes),
            ("process.limits.threads", p.limits.threads),
        ]
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.server.enabled {
            anyhow::ensure!(
                self.server.port > 0,
                "server.port must be between 1 and 65535, got {}",
                self.server.port
            );
            anyhow::ensure!(!self.server.host.is_empty(), "server.host must be non-empty");
        }
        anyhow::ensure!(
            self.monitoring.tick_interval_ms > 0,
            "monitoring.tick_interval_ms must be > 0, got {}",
            self.monitoring.tick_interval_ms
        );
        anyhow::ensure!(
            self.monitoring.history_capacity > 0,
            "monitoring.history_capacity must be > 0, got {}",
            self.monitoring.history_capacity
        );
        anyhow::ensure!(
            self.monitoring.top_n > 0,
            "monitoring.top_n must be > 0, got {}",
            self.monitoring.top_n
        );
        anyhow::ensure!(
            self.monitoring.max_tree_depth > 0,
            "monitoring.max_tree_depth must be > 0, got {}",
            self.monitoring.max_tree_depth
        );
        anyhow::ensure!(
            self.monitoring.stats_log_interval_secs > 0,
            "monitoring.stats_log_interval_secs must be > 0, got {}",
            self.monitoring.stats_log_interval_secs
        );
        anyhow::ensure!(
            self.monitoring.latency_timeout_ms > 0,
            "monitoring.latency_timeout_ms must be > 0, got {}",
            self.monitoring.latency_timeout_ms
        );
        for kind in MonitorKind::ALL {
            anyhow::ensure!(self.top_n_for(kind) > 0, "{}.top_n must be > 0", kind);
        }
        anyhow::ensure!(
            self.memory.leak_window > 0,
            "memory.leak_window must be > 0, got {}",
            self.memory.leak_window
        );
        for (name, t) in self.thresholds() {
            anyhow::ensure!(
                t.warning.is_finite() && t.critical.is_finite(),
                "{} thresholds must be finite, got warning {} critical {}",
                name,
                t.warning,
                t.critical
            );
        }
        for (name, level) in self.warning_levels() {
            anyhow::ensure!(
                level.is_finite(),
                "{} must be finite, got {}",
                name,
                level
            );
        }
        anyhow::ensure!(
            !self.enabled_monitors().is_empty(),
            "at least one monitor must be enabled"
        );
        Ok(())
    }

    /// Warning above critical is tolerated; the classifier falls back to the critical level.
    fn warn_misconfigured(&self) {
        for (name, t) in self.thresholds() {
            if t.is_misconfigured() {
                tracing::warn!(
                    threshold = name,
                    warning = t.warning,
                    critical = t.critical,
                    "warning level above critical level, critical level will be used"
                );
            }
        }
    }
}
