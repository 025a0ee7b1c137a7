// Threshold checks and severity escalation

use serde::{Deserialize, Serialize};

/// Ordered so that `max` escalates.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Normal,
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Normal => "normal",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdCheck {
    pub name: String,
    pub value: f64,
    pub warning: f64,
    pub critical: f64,
}

impl ThresholdCheck {
    pub fn new(name: impl Into<String>, value: f64, warning: f64, critical: f64) -> Self {
        Self {
            name: name.into(),
            value,
            warning,
            critical,
        }
    }

    /// Check that can reach Warning but never Critical.
    pub fn warning_only(name: impl Into<String>, value: f64, warning: f64) -> Self {
        Self::new(name, value, warning, f64::INFINITY)
    }

    /// Boolean alert raised at Warning when `fired`.
    pub fn flag(name: impl Into<String>, fired: bool) -> Self {
        Self::warning_only(name, if fired { 1.0 } else { 0.0 }, 1.0)
    }

    pub fn is_misconfigured(&self) -> bool {
        self.warning > self.critical
    }

    /// Severity plus the threshold that produced it.
    /// With warning above critical only the critical level binds.
    pub fn evaluate(&self) -> (Severity, f64) {
        if self.value >= self.critical {
            (Severity::Critical, self.critical)
        } else if !self.is_misconfigured() && self.value >= self.warning {
            (Severity::Warning, self.warning)
        } else {
            (Severity::Normal, self.warning)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveFlag {
    pub name: String,
    pub severity: Severity,
    pub value: f64,
    pub threshold: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub overall: Severity,
    /// Every check at Warning or above, in check order.
    pub active_flags: Vec<ActiveFlag>,
    /// Checks whose warning level exceeded their critical level.
    pub misconfigured: Vec<String>,
}

impl StatusReport {
    pub fn flag(&self, name: &str) -> Option<&ActiveFlag> {
        self.active_flags.iter().find(|f| f.name == name)
    }

    pub fn severity_of(&self, name: &str) -> Severity {
        self.flag(name).map(|f| f.severity).unwrap_or_default()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.active_flags
            .iter()
            .filter(|f| f.severity == severity)
            .count()
    }
}

/// Evaluates each check on its own, then raises the overall status to the
/// highest individual severity. An empty set is Normal.
pub fn classify(checks: &[ThresholdCheck]) -> StatusReport {
    let mut report = StatusReport::default();
    for check in checks {
        if check.is_misconfigured() {
            tracing::debug!(
                check = %check.name,
                warning = check.warning,
                critical = check.critical,
                "warning above critical, using critical level"
            );
            report.misconfigured.push(check.name.clone());
        }
        let (severity, threshold) = check.evaluate();
        if severity == Severity::Normal {
            continue;
        }
        report.overall = report.overall.max(severity);
        report.active_flags.push(ActiveFlag {
            name: check.name.clone(),
            severity,
            value: check.value,
            threshold,
        });
    }
    report
}
