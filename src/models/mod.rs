// Domain models: samples, raw provider snapshots, process entities, reports, host identity

mod entity;
mod kind;
mod raw;
mod report;
mod sample;
mod system;

pub use entity::{ProcessEntry, ProcessState};
pub use kind::{MonitorKind, UnknownMonitor};
pub use raw::{
    CpuRaw, CpuTimes, DeviceTemperature, DiskIoRaw, DiskRaw, InterfaceRaw, LatencyProbe,
    LoadAverage, MemoryRaw, NetworkRaw, PartitionRaw, ProcessRaw, RawSnapshot,
};
pub use report::Report;
pub use sample::{MetricSample, MetricSampleBuilder};
pub use system::{CpuInfo, SystemInfo};
