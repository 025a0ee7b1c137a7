// Raw metric acquisition: the provider boundary and its sysinfo-backed implementation

mod linux;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use sysinfo::{Disks, Networks, ProcessStatus, ProcessesToUpdate, System, Users};
use tracing::instrument;

pub use crate::error::ProviderError;
use crate::models::*;

/// One raw reading per call. Latency and timeouts are the implementor's concern.
#[async_trait]
pub trait MetricProvider: Send + Sync {
    async fn sample(&self, kind: MonitorKind) -> Result<RawSnapshot, ProviderError>;
}

#[async_trait]
impl<P: MetricProvider + ?Sized> MetricProvider for Arc<P> {
    async fn sample(&self, kind: MonitorKind) -> Result<RawSnapshot, ProviderError> {
        (**self).sample(kind).await
    }
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub latency_targets: Vec<String>,
    pub latency_timeout: Duration,
    /// Process list reuse window. Refreshing sooner than this skews `cpu_usage`.
    pub process_refresh_interval: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            latency_targets: vec!["8.8.8.8:53".into(), "1.1.1.1:53".into()],
            latency_timeout: Duration::from_millis(1000),
            process_refresh_interval: Duration::from_millis(500),
        }
    }
}

type Counters<T> = Arc<Mutex<Option<(HashMap<String, T>, Instant)>>>;

/// One process refresh shared by every monitor sampling within `min_interval`.
#[derive(Debug)]
struct ProcessCache {
    entries: Vec<ProcessEntry>,
    refreshed_at: Option<Instant>,
    min_interval: Duration,
}

impl ProcessCache {
    fn new(min_interval: Duration) -> Self {
        Self {
            entries: Vec::new(),
            refreshed_at: None,
            min_interval,
        }
    }

    fn is_fresh(&self, now: Instant) -> bool {
        self.refreshed_at
            .is_some_and(|at| now.saturating_duration_since(at) < self.min_interval)
    }

    fn get_or_refresh(
        &mut self,
        now: Instant,
        refresh: impl FnOnce() -> Vec<ProcessEntry>,
    ) -> Vec<ProcessEntry> {
        if !self.is_fresh(now) {
            self.entries = refresh();
            self.refreshed_at = Some(now);
        }
        self.entries.clone()
    }
}

/// Cached process list, refreshing `sys` only when the cache has gone stale.
fn cached_processes(
    cache: &ProcessSource,
    sys: &mut System,
) -> Result<Vec<ProcessEntry>, ProviderError> {
    let users = cache
        .users
        .lock()
        .map_err(|_| ProviderError::LockPoisoned("sysinfo users"))?;
    let mut entries = cache
        .entries
        .lock()
        .map_err(|_| ProviderError::LockPoisoned("process cache"))?;
    Ok(entries.get_or_refresh(Instant::now(), || collect_processes(sys, &users)))
}

/// Process cache plus the user table used to resolve owners.
struct ProcessSource {
    entries: Mutex<ProcessCache>,
    users: Mutex<Users>,
}

pub struct SysinfoProvider {
    config: ProviderConfig,
    sys: Arc<Mutex<System>>,
    disks: Arc<Mutex<Disks>>,
    networks: Arc<Mutex<Networks>>,
    last_cpu_jiffies: Arc<Mutex<Option<linux::CpuJiffies>>>,
    last_disk_io: Counters<linux::DiskCounters>,
    last_network: Counters<(u64, u64)>,
    processes: Arc<ProcessSource>,
}

impl Default for SysinfoProvider {
    fn default() -> Self {
        Self::new(ProviderConfig::default())
    }
}

fn process_state(status: ProcessStatus) -> ProcessState {
    match status {
        ProcessStatus::Run => ProcessState::Running,
        ProcessStatus::Sleep => ProcessState::Sleeping,
        ProcessStatus::Idle => ProcessState::Idle,
        ProcessStatus::Zombie => ProcessState::Zombie,
        ProcessStatus::Stop => ProcessState::Stopped,
        _ => ProcessState::Other,
    }
}

/// Refreshes and lists every process, ordered by pid.
fn collect_processes(sys: &mut System, users: &Users) -> Vec<ProcessEntry> {
    sys.refresh_memory();
    sys.refresh_processes(ProcessesToUpdate::All, true);
    let total_memory = sys.total_memory() as f64;
    let mut processes: Vec<ProcessEntry> = sys
        .processes()
        .values()
        .map(|p| {
            let disk = p.disk_usage();
            let memory = p.memory();
            ProcessEntry {
                pid: p.pid().as_u32(),
                parent_pid: p.parent().map(|pp| pp.as_u32()),
                name: p.name().to_string_lossy().into_owned(),
                user: p
                    .user_id()
                    .and_then(|uid| users.get_user_by_id(uid))
                    .map(|u| u.name().to_string()),
                state: process_state(p.status()),
                cpu_percent: p.cpu_usage() as f64,
                memory_percent: if total_memory > 0.0 {
                    memory as f64 / total_memory * 100.0
                } else {
                    0.0
                },
                memory_rss: memory,
                memory_virtual: p.virtual_memory(),
                threads: (1 + p.tasks().map(|t| t.len()).unwrap_or(0)).min(u32::MAX as usize)
                    as u32,
                io_read_bytes: disk.total_read_bytes,
                io_write_bytes: disk.total_written_bytes,
                start_time: p.start_time(),
                run_time_secs: p.run_time(),
            }
        })
        .collect();
    processes.sort_by_key(|p| p.pid);
    processes
}

/// Per-second rate of a monotonically increasing counter.
fn rate(now: u64, prev: u64, dt_secs: f64) -> f64 {
    if dt_secs > 0.0 {
        now.saturating_sub(prev) as f64 / dt_secs
    } else {
        0.0
    }
}

impl SysinfoProvider {
    pub fn new(config: ProviderConfig) -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();
        let disks = Disks::new_with_refreshed_list();
        let networks = Networks::new_with_refreshed_list();
        let processes = Arc::new(ProcessSource {
            entries: Mutex::new(ProcessCache::new(config.process_refresh_interval)),
            users: Mutex::new(Users::new_with_refreshed_list()),
        });
        Self {
            config,
            sys: Arc::new(Mutex::new(sys)),
            disks: Arc::new(Mutex::new(disks)),
            networks: Arc::new(Mutex::new(networks)),
            last_cpu_jiffies: Arc::new(Mutex::new(linux::read_cpu_jiffies_linux())),
            last_disk_io: Arc::new(Mutex::new(None)),
            last_network: Arc::new(Mutex::new(None)),
            processes,
        }
    }

    #[instrument(skip(self), fields(provider = "sysinfo", operation = "sample_cpu"))]
    pub async fn sample_cpu(&self) -> Result<CpuRaw, ProviderError> {
        let sys = self.sys.clone();
        let process_cache = self.processes.clone();
        let last_cpu_jiffies = self.last_cpu_jiffies.clone();
        tokio::task::spawn_blocking(move || {
            let mut sys = sys
                .lock()
                .map_err(|_| ProviderError::LockPoisoned("sysinfo"))?;
            sys.refresh_cpu_all();

            let times = match linux::read_cpu_jiffies_linux() {
                Some(now) => {
                    let mut guard = last_cpu_jiffies
                        .lock()
                        .map_err(|_| ProviderError::LockPoisoned("cpu jiffies"))?;
                    let delta = (*guard).map(|prev| now.delta(&prev));
                    *guard = Some(now);
                    delta.map(|d| CpuTimes {
                        user: d.user as f64,
                        system: d.system as f64,
                        idle: d.idle as f64,
                        iowait: d.iowait as f64,
                    })
                }
                None => None,
            };

            let load = System::load_average();
            let processes = cached_processes(&process_cache, &mut sys)?;
            Ok::<_, ProviderError>(CpuRaw {
                usage_percent: (sys.global_cpu_usage() as f64).clamp(0.0, 100.0),
                per_core_percent: sys.cpus().iter().map(|c| c.cpu_usage() as f64).collect(),
                core_frequencies_mhz: sys.cpus().iter().map(|c| c.frequency()).collect(),
                times,
                load_average: LoadAverage {
                    one: load.one,
                    five: load.five,
                    fifteen: load.fifteen,
                },
                temperature_celsius: linux::read_cpu_temperature_linux(),
                processes,
            })
        })
        .await
        .map_err(|e| ProviderError::Join(e.to_string()))?
    }

    #[instrument(skip(self), fields(provider = "sysinfo", operation = "sample_memory"))]
    pub async fn sample_memory(&self) -> Result<MemoryRaw, ProviderError> {
        let sys = self.sys.clone();
        let process_cache = self.processes.clone();
        tokio::task::spawn_blocking(move || {
            let mut sys = sys
                .lock()
                .map_err(|_| ProviderError::LockPoisoned("sysinfo"))?;
            sys.refresh_memory();
            let processes = cached_processes(&process_cache, &mut sys)?;

            let total = sys.total_memory();
            let available = sys.available_memory();
            let extra = linux::read_meminfo_linux().unwrap_or_default();
            Ok::<_, ProviderError>(MemoryRaw {
                total,
                available,
                used: total.saturating_sub(available),
                free: sys.free_memory(),
                cached: extra.cached,
                buffers: extra.buffers,
                shared: extra.shared,
                swap_total: sys.total_swap(),
                swap_used: sys.used_swap(),
                swap_free: sys.free_swap(),
                processes,
            })
        })
        .await
        .map_err(|e| ProviderError::Join(e.to_string()))?
    }

    #[instrument(skip(self), fields(provider = "sysinfo", operation = "sample_disk"))]
    pub async fn sample_disk(&self) -> Result<DiskRaw, ProviderError> {
        let sys = self.sys.clone();
        let process_cache = self.processes.clone();
        let disks = self.disks.clone();
        let last_disk_io = self.last_disk_io.clone();
        tokio::task::spawn_blocking(move || {
            let partitions: Vec<PartitionRaw> = {
                let mut disks = disks
                    .lock()
                    .map_err(|_| ProviderError::LockPoisoned("sysinfo disks"))?;
                disks.refresh(true);
                disks
                    .list()
                    .iter()
                    .map(|d| {
                        let total = d.total_space();
                        let free = d.available_space();
                        PartitionRaw {
                            device: d.name().to_string_lossy().into_owned(),
                            mount_point: d.mount_point().to_string_lossy().into_owned(),
                            file_system: d.file_system().to_string_lossy().into_owned(),
                            total,
                            used: total.saturating_sub(free),
                            free,
                        }
                    })
                    .collect()
            };

            let mut devices = Vec::new();
            if let Some(now_stats) = linux::read_diskstats_linux() {
                let now = Instant::now();
                let mut guard = last_disk_io
                    .lock()
                    .map_err(|_| ProviderError::LockPoisoned("disk io counters"))?;
                if let Some((prev, prev_ts)) = guard.as_ref() {
                    let dt = now.duration_since(*prev_ts).as_secs_f64();
                    let mut names: Vec<&String> = now_stats.keys().collect();
                    names.sort();
                    for name in names {
                        let (Some(cur), Some(old)) = (now_stats.get(name), prev.get(name)) else {
                            continue;
                        };
                        let busy_ms = cur.io_ticks_ms.saturating_sub(old.io_ticks_ms) as f64;
                        devices.push(DiskIoRaw {
                            device: name.clone(),
                            read_bytes_per_sec: rate(cur.sectors_read, old.sectors_read, dt)
                                * linux::DISKSTATS_SECTOR_BYTES as f64,
                            write_bytes_per_sec: rate(
                                cur.sectors_written,
                                old.sectors_written,
                                dt,
                            ) * linux::DISKSTATS_SECTOR_BYTES as f64,
                            reads_per_sec: rate(cur.reads, old.reads, dt),
                            writes_per_sec: rate(cur.writes, old.writes, dt),
                            utilization_percent: if dt > 0.0 {
                                (busy_ms / (dt * 1000.0) * 100.0).clamp(0.0, 100.0)
                            } else {
                                0.0
                            },
                        });
                    }
                }
                *guard = Some((now_stats, now));
            }

            let temperatures = linux::read_disk_temperatures_linux()
                .into_iter()
                .map(|(device, celsius)| DeviceTemperature { device, celsius })
                .collect();

            let mut sys = sys
                .lock()
                .map_err(|_| ProviderError::LockPoisoned("sysinfo"))?;
            Ok::<_, ProviderError>(DiskRaw {
                partitions,
                devices,
                temperatures,
                processes: cached_processes(&process_cache, &mut sys)?,
            })
        })
        .await
        .map_err(|e| ProviderError::Join(e.to_string()))?
    }

    #[instrument(skip(self), fields(provider = "sysinfo", operation = "sample_network"))]
    pub async fn sample_network(&self) -> Result<NetworkRaw, ProviderError> {
        let sys = self.sys.clone();
        let process_cache = self.processes.clone();
        let networks = self.networks.clone();
        let last_network = self.last_network.clone();
        let mut raw = tokio::task::spawn_blocking(move || {
            let mut networks = networks
                .lock()
                .map_err(|_| ProviderError::LockPoisoned("sysinfo networks"))?;
            networks.refresh(true);
            let mut interfaces: Vec<InterfaceRaw> = networks
                .list()
                .iter()
                .map(|(name, data)| {
                    let (drops_in, drops_out) = linux::read_interface_drops_linux(name);
                    InterfaceRaw {
                        name: name.clone(),
                        bytes_sent: data.total_transmitted(),
                        bytes_recv: data.total_received(),
                        packets_sent: data.total_packets_transmitted(),
                        packets_recv: data.total_packets_received(),
                        errors_in: data.total_errors_on_received(),
                        errors_out: data.total_errors_on_transmitted(),
                        drops_in,
                        drops_out,
                        sent_bytes_per_sec: 0.0,
                        recv_bytes_per_sec: 0.0,
                        speed_bits: linux::get_interface_speed(name),
                    }
                })
                .collect();
            interfaces.sort_by(|a, b| a.name.cmp(&b.name));

            let now = Instant::now();
            let mut guard = last_network
                .lock()
                .map_err(|_| ProviderError::LockPoisoned("network counters"))?;
            if let Some((prev, prev_ts)) = guard.as_ref() {
                let dt = now.duration_since(*prev_ts).as_secs_f64();
                for iface in &mut interfaces {
                    if let Some(&(sent, recv)) = prev.get(&iface.name) {
                        iface.sent_bytes_per_sec = rate(iface.bytes_sent, sent, dt);
                        iface.recv_bytes_per_sec = rate(iface.bytes_recv, recv, dt);
                    }
                }
            }
            *guard = Some((
                interfaces
                    .iter()
                    .map(|i| (i.name.clone(), (i.bytes_sent, i.bytes_recv)))
                    .collect(),
                now,
            ));
            drop(guard);

            let mut sys = sys
                .lock()
                .map_err(|_| ProviderError::LockPoisoned("sysinfo"))?;
            Ok::<_, ProviderError>(NetworkRaw {
                interfaces,
                latency: Vec::new(),
                connection_count: linux::read_connection_count_linux(),
                processes: cached_processes(&process_cache, &mut sys)?,
            })
        })
        .await
        .map_err(|e| ProviderError::Join(e.to_string()))??;

        raw.latency = self.probe_latency().await;
        Ok(raw)
    }

    #[instrument(skip(self), fields(provider = "sysinfo", operation = "sample_process"))]
    pub async fn sample_process(&self) -> Result<ProcessRaw, ProviderError> {
        let sys = self.sys.clone();
        let process_cache = self.processes.clone();
        tokio::task::spawn_blocking(move || {
            let mut sys = sys
                .lock()
                .map_err(|_| ProviderError::LockPoisoned("sysinfo"))?;
            Ok::<_, ProviderError>(ProcessRaw {
                processes: cached_processes(&process_cache, &mut sys)?,
            })
        })
        .await
        .map_err(|e| ProviderError::Join(e.to_string()))?
    }

    /// Static host identity; fetch once at startup.
    #[instrument(skip(self), fields(provider = "sysinfo", operation = "system_info"))]
    pub async fn system_info(&self) -> Result<SystemInfo, ProviderError> {
        let sys = self.sys.clone();
        let disks = self.disks.clone();
        let networks = self.networks.clone();
        tokio::task::spawn_blocking(move || {
            let disk_count = disks
                .lock()
                .map_err(|_| ProviderError::LockPoisoned("sysinfo disks"))?
                .list()
                .len();
            let interface_count = networks
                .lock()
                .map_err(|_| ProviderError::LockPoisoned("sysinfo networks"))?
                .list()
                .len();
            let sys = sys
                .lock()
                .map_err(|_| ProviderError::LockPoisoned("sysinfo"))?;

            let first_cpu = sys.cpus().first();
            let (model_name, vendor_id) = linux::read_cpuinfo_linux();
            let cpu = CpuInfo {
                model_name: model_name
                    .or_else(|| {
                        first_cpu
                            .map(|c| c.brand().to_string())
                            .filter(|s| !s.is_empty())
                    })
                    .unwrap_or_else(|| "Unknown".into()),
                vendor_id: vendor_id
                    .or_else(|| first_cpu.map(|c| c.vendor_id().to_string()))
                    .unwrap_or_default(),
                physical_cores: System::physical_core_count().unwrap_or(0) as u32,
                logical_cores: sys.cpus().len() as u32,
                frequency_mhz: first_cpu.map(|c| c.frequency()).unwrap_or(0),
            };
            Ok::<_, ProviderError>(SystemInfo {
                host_name: System::host_name().unwrap_or_default(),
                operating_system: System::name().unwrap_or_else(|| std::env::consts::OS.into()),
                os_version: System::os_version().unwrap_or_default(),
                kernel_version: System::kernel_version().unwrap_or_default(),
                architecture: std::env::consts::ARCH.into(),
                boot_time: System::boot_time(),
                cpu,
                total_memory: sys.total_memory(),
                total_swap: sys.total_swap(),
                disk_count,
                interface_count,
            })
        })
        .await
        .map_err(|e| ProviderError::Join(e.to_string()))?
    }

    /// TCP connect round trip per target; a timeout or refusal counts as a lost probe.
    async fn probe_latency(&self) -> Vec<LatencyProbe> {
        let mut probes = Vec::with_capacity(self.config.latency_targets.len());
        for target in &self.config.latency_targets {
            let started = Instant::now();
            let result = tokio::time::timeout(
                self.config.latency_timeout,
                tokio::net::TcpStream::connect(target.as_str()),
            )
            .await;
            let latency_ms = match result {
                Ok(Ok(_stream)) => Some(started.elapsed().as_secs_f64() * 1000.0),
                Ok(Err(e)) => {
                    tracing::debug!(probe = %target, error = %e, "latency probe failed");
                    None
                }
                Err(_) => {
                    tracing::debug!(probe = %target, "latency probe timed out");
                    None
                }
            };
            probes.push(LatencyProbe {
                target: target.clone(),
                latency_ms,
            });
        }
        probes
    }
}

#[async_trait]
impl MetricProvider for SysinfoProvider {
    async fn sample(&self, kind: MonitorKind) -> Result<RawSnapshot, ProviderError> {
        match kind {
            MonitorKind::Cpu => self.sample_cpu().await.map(RawSnapshot::Cpu),
            MonitorKind::Memory => self.sample_memory().await.map(RawSnapshot::Memory),
            MonitorKind::Disk => self.sample_disk().await.map(RawSnapshot::Disk),
            MonitorKind::Network => self.sample_network().await.map(RawSnapshot::Network),
            MonitorKind::Process => self.sample_process().await.map(RawSnapshot::Process),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monitors_sampling_within_the_window_share_one_process_refresh() {
        let mut cache = ProcessCache::new(Duration::from_millis(500));
        let start = Instant::now();
        let mut refreshes = 0;
        let mut refresh = |pid| {
            refreshes += 1;
            vec![ProcessEntry::new(pid, None, "worker")]
        };

        let first = cache.get_or_refresh(start, || refresh(1));
        let second = cache.get_or_refresh(start + Duration::from_millis(120), || refresh(2));
        assert_eq!(first[0].pid, 1);
        assert_eq!(second[0].pid, 1);

        let later = cache.get_or_refresh(start + Duration::from_millis(500), || refresh(3));
        assert_eq!(later[0].pid, 3);
        assert_eq!(refreshes, 2);
    }

    #[test]
    fn empty_cache_is_never_fresh() {
        let cache = ProcessCache::new(Duration::from_secs(60));
        assert!(!cache.is_fresh(Instant::now()));
    }
}
