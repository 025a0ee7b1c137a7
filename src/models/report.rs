// Finished per-tick output handed to readers

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{MonitorKind, ProcessEntry};
use crate::error::InvalidSampleValue;
use crate::history::HistoryPoint;
use crate::ranking::RankedEntity;
use crate::status::{Severity, StatusReport};
use crate::tree::TreeNode;

/// Fully built before it is published; readers only ever see complete reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub timestamp: u64,
    pub monitor: MonitorKind,
    pub derived_fields: BTreeMap<String, f64>,
    pub history: BTreeMap<String, Vec<HistoryPoint>>,
    pub rankings: BTreeMap<String, Vec<RankedEntity<ProcessEntry>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tree: Option<Vec<TreeNode<ProcessEntry>>>,
    pub status: StatusReport,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_status: Option<StatusReport>,
    #[serde(default)]
    pub rejected: Vec<InvalidSampleValue>,
}

impl Report {
    pub fn overall(&self) -> Severity {
        self.status.overall
    }

    pub fn field(&self, name: &str) -> Option<f64> {
        self.derived_fields.get(name).copied()
    }

    pub fn series(&self, name: &str) -> Option<&[HistoryPoint]> {
        self.history.get(name).map(Vec::as_slice)
    }

    pub fn ranking(&self, dimension: &str) -> Option<&[RankedEntity<ProcessEntry>]> {
        self.rankings.get(dimension).map(Vec::as_slice)
    }

    /// Pids of one ranking, best first.
    pub fn ranked_pids(&self, dimension: &str) -> Vec<u32> {
        self.ranking(dimension)
            .map(|r| r.iter().map(|e| e.entity.pid).collect())
            .unwrap_or_default()
    }
}
