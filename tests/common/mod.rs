// Shared test helpers: scripted provider and raw snapshot fixtures
#![allow(dead_code)]

use async_trait::async_trait;
use hostpulse::error::ProviderError;
use hostpulse::models::*;
use hostpulse::provider::MetricProvider;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Replays a queue of results; once drained it keeps returning `fallback` (or an error).
/// Optional per-call delays are consumed in order, after which calls return at once.
pub struct FakeProvider {
    script: Mutex<VecDeque<Result<RawSnapshot, ProviderError>>>,
    fallback: Option<RawSnapshot>,
    delays: Mutex<VecDeque<Duration>>,
    calls: AtomicUsize,
}

impl FakeProvider {
    pub fn scripted(script: Vec<Result<RawSnapshot, ProviderError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: None,
            delays: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn repeating(snapshot: RawSnapshot) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Some(snapshot),
            delays: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delays(self, delays: Vec<Duration>) -> Self {
        *self.delays.lock().unwrap() = delays.into();
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetricProvider for FakeProvider {
    async fn sample(&self, _kind: MonitorKind) -> Result<RawSnapshot, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(result) => result,
            None => self.fallback.clone().ok_or_else(|| ProviderError::Platform {
                operation: "fake_sample",
                message: "script exhausted".into(),
            }),
        }
    }
}

pub fn system_info() -> SystemInfo {
    SystemInfo {
        host_name: "rack-01".into(),
        operating_system: "Debian GNU/Linux".into(),
        os_version: "12".into(),
        kernel_version: "6.1.0".into(),
        architecture: "x86_64".into(),
        boot_time: 1_700_000_000,
        cpu: CpuInfo {
            model_name: "AMD EPYC 7302".into(),
            vendor_id: "AuthenticAMD".into(),
            physical_cores: 16,
            logical_cores: 32,
            frequency_mhz: 3000,
        },
        total_memory: 64 * 1024 * 1024 * 1024,
        total_swap: 0,
        disk_count: 2,
        interface_count: 3,
    }
}

pub fn platform_error() -> ProviderError {
    ProviderError::Platform {
        operation: "fake_sample",
        message: "device busy".into(),
    }
}

pub fn proc_entry(pid: u32, parent: Option<u32>, cpu: f64, memory: f64) -> ProcessEntry {
    let mut p = ProcessEntry::new(pid, parent, format!("proc-{}", pid));
    p.cpu_percent = cpu;
    p.memory_percent = memory;
    p
}

pub fn cpu_snapshot(usage: f64, cores: &[f64]) -> RawSnapshot {
    RawSnapshot::Cpu(CpuRaw {
        usage_percent: usage,
        per_core_percent: cores.to_vec(),
        core_frequencies_mhz: vec![],
        times: None,
        load_average: LoadAverage {
            one: 0.5,
            five: 0.4,
            fifteen: 0.3,
        },
        temperature_celsius: None,
        processes: vec![],
    })
}

/// `total` of 1000 bytes so `used` reads directly as tenths of a percent.
pub fn memory_snapshot(used: u64) -> RawSnapshot {
    RawSnapshot::Memory(MemoryRaw {
        total: 1000,
        available: 1000 - used,
        used,
        free: 1000 - used,
        cached: 0,
        buffers: 0,
        shared: 0,
        swap_total: 0,
        swap_used: 0,
        swap_free: 0,
        processes: vec![],
    })
}

pub fn disk_snapshot(used_percent: u64, temperatures: &[(&str, f64)]) -> RawSnapshot {
    RawSnapshot::Disk(DiskRaw {
        partitions: vec![PartitionRaw {
            device: "/dev/sda1".into(),
            mount_point: "/".into(),
            file_system: "ext4".into(),
            total: 100,
            used: used_percent,
            free: 100 - used_percent,
        }],
        devices: vec![],
        temperatures: temperatures
            .iter()
            .map(|(device, celsius)| DeviceTemperature {
                device: device.to_string(),
                celsius: *celsius,
            })
            .collect(),
        processes: vec![],
    })
}

pub fn process_snapshot(processes: Vec<ProcessEntry>) -> RawSnapshot {
    RawSnapshot::Process(ProcessRaw { processes })
}
