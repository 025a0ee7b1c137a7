// Process record shared by rankings and the process tree

use serde::{Deserialize, Serialize};

use crate::tree::TreeEntity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessState {
    Running,
    Sleeping,
    Idle,
    Zombie,
    Stopped,
    Other,
}

impl ProcessState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessState::Running => "running",
            ProcessState::Sleeping => "sleeping",
            ProcessState::Idle => "idle",
            ProcessState::Zombie => "zombie",
            ProcessState::Stopped => "stopped",
            ProcessState::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessEntry {
    pub pid: u32,
    pub parent_pid: Option<u32>,
    pub name: String,
    /// Owner name; absent when the uid cannot be resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    pub state: ProcessState,
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub memory_rss: u64,
    pub memory_virtual: u64,
    pub threads: u32,
    pub io_read_bytes: u64,
    pub io_write_bytes: u64,
    /// Unix seconds.
    pub start_time: u64,
    pub run_time_secs: u64,
}

impl ProcessEntry {
    /// Bare entry with zeroed usage; handy for fixtures and partial platform data.
    pub fn new(pid: u32, parent_pid: Option<u32>, name: impl Into<String>) -> Self {
        Self {
            pid,
            parent_pid,
            name: name.into(),
            user: None,
            state: ProcessState::Running,
            cpu_percent: 0.0,
            memory_percent: 0.0,
            memory_rss: 0,
            memory_virtual: 0,
            threads: 1,
            io_read_bytes: 0,
            io_write_bytes: 0,
            start_time: 0,
            run_time_secs: 0,
        }
    }

    pub fn io_total(&self) -> u64 {
        self.io_read_bytes.saturating_add(self.io_write_bytes)
    }
}

impl TreeEntity for ProcessEntry {
    fn id(&self) -> u32 {
        self.pid
    }

    fn parent_id(&self) -> Option<u32> {
        self.parent_pid
    }
}
