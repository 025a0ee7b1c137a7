// Error taxonomy for sampling and ticks

use serde::{Deserialize, Serialize};

use crate::models::MonitorKind;

/// Raw sampling failed. Aborts one tick; the next tick tries again.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    #[error("{operation}: {message}")]
    Platform {
        operation: &'static str,
        message: String,
    },
    #[error("{0} lock poisoned")]
    LockPoisoned(&'static str),
    #[error("provider task join: {0}")]
    Join(String),
    #[error("expected {expected} snapshot, got {got}")]
    UnexpectedSnapshot {
        expected: MonitorKind,
        got: MonitorKind,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InvalidReason {
    NonFinite,
    Negative,
}

/// A single field dropped from one tick. Never aborts the tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "camelCase")]
#[error("invalid value {value} for {field}: {reason:?}")]
pub struct InvalidSampleValue {
    pub field: String,
    pub value: f64,
    pub reason: InvalidReason,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum TickError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
}
