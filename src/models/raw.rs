// Raw per-monitor readings as returned by a MetricProvider

use serde::{Deserialize, Serialize};

use super::{MonitorKind, ProcessEntry};

/// Cumulative CPU time deltas since the previous reading, in jiffies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuTimes {
    pub user: f64,
    pub system: f64,
    pub idle: f64,
    pub iowait: f64,
}

impl CpuTimes {
    pub fn total(&self) -> f64 {
        self.user + self.system + self.idle + self.iowait
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadAverage {
    pub one: f64,
    pub five: f64,
    pub fifteen: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuRaw {
    pub usage_percent: f64,
    pub per_core_percent: Vec<f64>,
    pub core_frequencies_mhz: Vec<u64>,
    pub times: Option<CpuTimes>,
    pub load_average: LoadAverage,
    pub temperature_celsius: Option<f64>,
    pub processes: Vec<ProcessEntry>,
}

/// Byte figures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryRaw {
    pub total: u64,
    pub available: u64,
    pub used: u64,
    pub free: u64,
    pub cached: u64,
    pub buffers: u64,
    pub shared: u64,
    pub swap_total: u64,
    pub swap_used: u64,
    pub swap_free: u64,
    pub processes: Vec<ProcessEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionRaw {
    pub device: String,
    pub mount_point: String,
    pub file_system: String,
    pub total: u64,
    pub used: u64,
    pub free: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskIoRaw {
    pub device: String,
    pub read_bytes_per_sec: f64,
    pub write_bytes_per_sec: f64,
    pub reads_per_sec: f64,
    pub writes_per_sec: f64,
    pub utilization_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceTemperature {
    pub device: String,
    pub celsius: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskRaw {
    pub partitions: Vec<PartitionRaw>,
    pub devices: Vec<DiskIoRaw>,
    pub temperatures: Vec<DeviceTemperature>,
    pub processes: Vec<ProcessEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceRaw {
    pub name: String,
    pub bytes_sent: u64,
    pub bytes_recv: u64,
    pub packets_sent: u64,
    pub packets_recv: u64,
    pub errors_in: u64,
    pub errors_out: u64,
    pub drops_in: u64,
    pub drops_out: u64,
    pub sent_bytes_per_sec: f64,
    pub recv_bytes_per_sec: f64,
    /// Link speed in bits per second, 0 when unknown.
    pub speed_bits: u64,
}

/// One reachability probe; `latency_ms` is `None` when the probe failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatencyProbe {
    pub target: String,
    pub latency_ms: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkRaw {
    pub interfaces: Vec<InterfaceRaw>,
    pub latency: Vec<LatencyProbe>,
    pub connection_count: Option<u64>,
    pub processes: Vec<ProcessEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRaw {
    pub processes: Vec<ProcessEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RawSnapshot {
    Cpu(CpuRaw),
    Memory(MemoryRaw),
    Disk(DiskRaw),
    Network(NetworkRaw),
    Process(ProcessRaw),
}

impl RawSnapshot {
    pub fn kind(&self) -> MonitorKind {
        match self {
            RawSnapshot::Cpu(_) => MonitorKind::Cpu,
            RawSnapshot::Memory(_) => MonitorKind::Memory,
            RawSnapshot::Disk(_) => MonitorKind::Disk,
            RawSnapshot::Network(_) => MonitorKind::Network,
            RawSnapshot::Process(_) => MonitorKind::Process,
        }
    }

    pub fn processes(&self) -> &[ProcessEntry] {
        match self {
            RawSnapshot::Cpu(r) => &r.processes,
            RawSnapshot::Memory(r) => &r.processes,
            RawSnapshot::Disk(r) => &r.processes,
            RawSnapshot::Network(r) => &r.processes,
            RawSnapshot::Process(r) => &r.processes,
        }
    }
}
