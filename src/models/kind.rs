// Monitor identity

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The five monitors a pipeline can be instantiated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonitorKind {
    Cpu,
    Memory,
    Disk,
    Network,
    Process,
}

impl MonitorKind {
    pub const ALL: [MonitorKind; 5] = [
        MonitorKind::Cpu,
        MonitorKind::Memory,
        MonitorKind::Disk,
        MonitorKind::Network,
        MonitorKind::Process,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MonitorKind::Cpu => "cpu",
            MonitorKind::Memory => "memory",
            MonitorKind::Disk => "disk",
            MonitorKind::Network => "network",
            MonitorKind::Process => "process",
        }
    }
}

impl fmt::Display for MonitorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown monitor: {0}")]
pub struct UnknownMonitor(pub String);

impl FromStr for MonitorKind {
    type Err = UnknownMonitor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MonitorKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownMonitor(s.to_string()))
    }
}
