// Static host identity, collected once at startup

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuInfo {
    pub model_name: String,
    pub vendor_id: String,
    pub physical_cores: u32,
    pub logical_cores: u32,
    pub frequency_mhz: u64,
}

/// Exposed via GET /api/system; never part of a per-tick report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    pub host_name: String,
    pub operating_system: String,
    pub os_version: String,
    pub kernel_version: String,
    pub architecture: String,
    /// Unix seconds.
    pub boot_time: u64,
    pub cpu: CpuInfo,
    pub total_memory: u64,
    pub total_swap: u64,
    pub disk_count: usize,
    pub interface_count: usize,
}

impl SystemInfo {
    /// Seconds since boot at `now` (unix seconds).
    pub fn uptime_secs(&self, now: u64) -> u64 {
        now.saturating_sub(self.boot_time)
    }
}
