// Linux-specific helpers: /proc counters, thermal and hwmon sensors, interface speed.

use std::collections::HashMap;

/// Sector size used by /proc/diskstats regardless of the device's physical sector size.
pub(super) const DISKSTATS_SECTOR_BYTES: u64 = 512;

/// Aggregate jiffies from the first line of /proc/stat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(super) struct CpuJiffies {
    pub user: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
}

impl CpuJiffies {
    pub fn delta(&self, prev: &CpuJiffies) -> CpuJiffies {
        CpuJiffies {
            user: self.user.saturating_sub(prev.user),
            system: self.system.saturating_sub(prev.system),
            idle: self.idle.saturating_sub(prev.idle),
            iowait: self.iowait.saturating_sub(prev.iowait),
        }
    }
}

/// user and nice count as user time; irq, softirq and steal as system time.
pub(super) fn parse_proc_stat_cpu(content: &str) -> Option<CpuJiffies> {
    let line = content.lines().find(|l| l.starts_with("cpu "))?;
    let v: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .filter_map(|s| s.parse().ok())
        .collect();
    if v.len() < 5 {
        return None;
    }
    let at = |i: usize| v.get(i).copied().unwrap_or(0);
    Some(CpuJiffies {
        user: at(0) + at(1),
        system: at(2) + at(5) + at(6) + at(7),
        idle: at(3),
        iowait: at(4),
    })
}

pub(super) fn read_cpu_jiffies_linux() -> Option<CpuJiffies> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string("/proc/stat").ok()?;
        parse_proc_stat_cpu(&content)
    }
    #[cfg(not(target_os = "linux"))]
    None
}

/// Page cache, buffers and shared memory in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(super) struct MemInfoExtra {
    pub cached: u64,
    pub buffers: u64,
    pub shared: u64,
}

pub(super) fn parse_meminfo(content: &str) -> MemInfoExtra {
    let mut out = MemInfoExtra::default();
    for line in content.lines() {
        let mut parts = line.split_whitespace();
        let (Some(key), Some(value)) = (parts.next(), parts.next()) else {
            continue;
        };
        let Ok(kib) = value.parse::<u64>() else {
            continue;
        };
        let bytes = kib * 1024;
        match key {
            "Cached:" => out.cached = bytes,
            "Buffers:" => out.buffers = bytes,
            "Shmem:" => out.shared = bytes,
            _ => {}
        }
    }
    out
}

pub(super) fn read_meminfo_linux() -> Option<MemInfoExtra> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string("/proc/meminfo").ok()?;
        Some(parse_meminfo(&content))
    }
    #[cfg(not(target_os = "linux"))]
    None
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(super) struct DiskCounters {
    pub reads: u64,
    pub sectors_read: u64,
    pub writes: u64,
    pub sectors_written: u64,
    pub io_ticks_ms: u64,
}

/// Device name -> counters. Loop and ram devices are skipped.
pub(super) fn parse_diskstats(content: &str) -> HashMap<String, DiskCounters> {
    let mut out = HashMap::new();
    for line in content.lines() {
        let f: Vec<&str> = line.split_whitespace().collect();
        if f.len() < 13 {
            continue;
        }
        let name = f[2];
        if name.starts_with("loop") || name.starts_with("ram") {
            continue;
        }
        let n = |i: usize| f[i].parse::<u64>().unwrap_or(0);
        out.insert(
            name.to_string(),
            DiskCounters {
                reads: n(3),
                sectors_read: n(5),
                writes: n(7),
                sectors_written: n(9),
                io_ticks_ms: n(12),
            },
        );
    }
    out
}

/// Whole block devices only (partitions are folded into their disk).
pub(super) fn read_diskstats_linux() -> Option<HashMap<String, DiskCounters>> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string("/proc/diskstats").ok()?;
        let mut stats = parse_diskstats(&content);
        stats.retain(|name, _| std::path::Path::new("/sys/block").join(name).exists());
        Some(stats)
    }
    #[cfg(not(target_os = "linux"))]
    None
}

/// First "model name" and "vendor_id" entries of /proc/cpuinfo.
pub(super) fn parse_cpuinfo(content: &str) -> (Option<String>, Option<String>) {
    let value = |key: &str| {
        content.lines().find_map(|line| {
            let (k, v) = line.split_once(':')?;
            let v = v.trim();
            (k.trim() == key && !v.is_empty()).then(|| v.to_string())
        })
    };
    (value("model name"), value("vendor_id"))
}

pub(super) fn read_cpuinfo_linux() -> (Option<String>, Option<String>) {
    #[cfg(target_os = "linux")]
    {
        if let Ok(content) = std::fs::read_to_string("/proc/cpuinfo") {
            return parse_cpuinfo(&content);
        }
    }
    (None, None)
}

/// Package or first cpu-type thermal zone, in °C.
pub(super) fn read_cpu_temperature_linux() -> Option<f64> {
    #[cfg(target_os = "linux")]
    {
        let mut fallback = None;
        for entry in std::fs::read_dir("/sys/class/thermal").ok()?.flatten() {
            let path = entry.path();
            let Ok(kind) = std::fs::read_to_string(path.join("type")) else {
                continue;
            };
            let Some(celsius) = read_millidegrees(&path.join("temp")) else {
                continue;
            };
            let kind = kind.trim();
            if kind == "x86_pkg_temp" || kind.contains("cpu") {
                return Some(celsius);
            }
            if fallback.is_none() && kind.starts_with("acpitz") {
                fallback = Some(celsius);
            }
        }
        fallback
    }
    #[cfg(not(target_os = "linux"))]
    None
}

/// Drive temperatures exposed by the drivetemp / nvme hwmon drivers.
pub(super) fn read_disk_temperatures_linux() -> Vec<(String, f64)> {
    let mut out = Vec::new();
    #[cfg(target_os = "linux")]
    {
        let Ok(blocks) = std::fs::read_dir("/sys/block") else {
            return out;
        };
        for block in blocks.flatten() {
            let name = block.file_name().to_string_lossy().into_owned();
            let Ok(hwmons) = std::fs::read_dir(block.path().join("device").join("hwmon")) else {
                continue;
            };
            if let Some(celsius) = hwmons
                .flatten()
                .find_map(|h| read_millidegrees(&h.path().join("temp1_input")))
            {
                out.push((name, celsius));
            }
        }
        out.sort_by(|a, b| a.0.cmp(&b.0));
    }
    out
}

#[cfg(target_os = "linux")]
fn read_millidegrees(path: &std::path::Path) -> Option<f64> {
    let raw = std::fs::read_to_string(path).ok()?;
    let milli = raw.trim().parse::<i64>().ok()?;
    Some(milli as f64 / 1000.0)
}

/// Read network interface link speed from /sys/class/net/<interface>/speed (Linux).
/// Returns speed in bits per second, or 0 if unavailable.
pub(super) fn get_interface_speed(interface_name: &str) -> u64 {
    #[cfg(target_os = "linux")]
    {
        let path = format!("/sys/class/net/{}/speed", interface_name);
        if let Ok(content) = std::fs::read_to_string(&path)
            && let Ok(mbps) = content.trim().parse::<i64>()
            && mbps > 0
        {
            return (mbps as u64) * 1_000_000;
        }
    }
    0
}

/// (rx_dropped, tx_dropped) from the interface statistics directory.
pub(super) fn read_interface_drops_linux(interface_name: &str) -> (u64, u64) {
    #[cfg(target_os = "linux")]
    {
        let read = |file: &str| {
            std::fs::read_to_string(format!(
                "/sys/class/net/{}/statistics/{}",
                interface_name, file
            ))
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(0)
        };
        (read("rx_dropped"), read("tx_dropped"))
    }
    #[cfg(not(target_os = "linux"))]
    {
        let _ = interface_name;
        (0, 0)
    }
}

/// Socket rows in a /proc/net/{tcp,tcp6,udp,udp6} table (header excluded).
pub(super) fn count_socket_entries(content: &str) -> u64 {
    content
        .lines()
        .skip(1)
        .filter(|l| !l.trim().is_empty())
        .count() as u64
}

pub(super) fn read_connection_count_linux() -> Option<u64> {
    #[cfg(target_os = "linux")]
    {
        let mut total = 0;
        let mut found = false;
        for table in ["tcp", "tcp6", "udp", "udp6"] {
            if let Ok(content) = std::fs::read_to_string(format!("/proc/net/{}", table)) {
                total += count_socket_entries(&content);
                found = true;
            }
        }
        found.then_some(total)
    }
    #[cfg(not(target_os = "linux"))]
    None
}
