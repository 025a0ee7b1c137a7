// One immutable snapshot of a monitor's derived values.
// Values are validated on the way in; a rejected value never reaches history or checks.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{InvalidReason, InvalidSampleValue};

/// Named numeric fields captured at one instant (Unix ms). Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSample {
    timestamp: u64,
    fields: BTreeMap<String, f64>,
}

impl MetricSample {
    pub fn builder(timestamp: u64) -> MetricSampleBuilder {
        MetricSampleBuilder {
            timestamp,
            fields: BTreeMap::new(),
            rejected: Vec::new(),
        }
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.fields.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn fields(&self) -> &BTreeMap<String, f64> {
        &self.fields
    }

    /// Fields whose name starts with `prefix`, in name order.
    pub fn with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = (&'a str, f64)> + 'a {
        self.fields
            .range(prefix.to_string()..)
            .take_while(move |(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_fields(self) -> BTreeMap<String, f64> {
        self.fields
    }
}

/// Collects fields for a [`MetricSample`], dropping non-finite or negative values.
#[derive(Debug)]
pub struct MetricSampleBuilder {
    timestamp: u64,
    fields: BTreeMap<String, f64>,
    rejected: Vec<InvalidSampleValue>,
}

impl MetricSampleBuilder {
    pub fn push(&mut self, name: impl Into<String>, value: f64) -> &mut Self {
        let name = name.into();
        let reason = if !value.is_finite() {
            Some(InvalidReason::NonFinite)
        } else if value < 0.0 {
            Some(InvalidReason::Negative)
        } else {
            None
        };
        match reason {
            Some(reason) => {
                self.fields.remove(&name);
                self.rejected.push(InvalidSampleValue {
                    field: name,
                    value,
                    reason,
                });
            }
            None => {
                self.fields.insert(name, value);
            }
        }
        self
    }

    /// Integer counters widen losslessly up to 2^53.
    pub fn push_u64(&mut self, name: impl Into<String>, value: u64) -> &mut Self {
        self.push(name, value as f64)
    }

    pub fn push_opt(&mut self, name: impl Into<String>, value: Option<f64>) -> &mut Self {
        if let Some(v) = value {
            self.push(name, v);
        }
        self
    }

    pub fn rejected(&self) -> &[InvalidSampleValue] {
        &self.rejected
    }

    pub fn build(self) -> (MetricSample, Vec<InvalidSampleValue>) {
        (
            MetricSample {
                timestamp: self.timestamp,
                fields: self.fields,
            },
            self.rejected,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_drops_invalid_values_and_keeps_the_rest() {
        let mut b = MetricSample::builder(10);
        b.push("ok", 1.5)
            .push("nan", f64::NAN)
            .push("neg", -3.0)
            .push_u64("count", 7);
        let (sample, rejected) = b.build();
        assert_eq!(sample.get("ok"), Some(1.5));
        assert_eq!(sample.get("count"), Some(7.0));
        assert!(!sample.contains("nan"));
        assert!(!sample.contains("neg"));
        assert_eq!(rejected.len(), 2);
        assert_eq!(rejected[0].reason, InvalidReason::NonFinite);
        assert_eq!(rejected[1].reason, InvalidReason::Negative);
    }

    #[test]
    fn with_prefix_only_yields_matching_fields() {
        let mut b = MetricSample::builder(0);
        b.push("cpu.core.0", 1.0)
            .push("cpu.core.1", 2.0)
            .push("cpu.core_max", 2.0)
            .push("cpu.usage", 5.0);
        let (sample, _) = b.build();
        let cores: Vec<_> = sample.with_prefix("cpu.core.").collect();
        assert_eq!(cores, vec![("cpu.core.0", 1.0), ("cpu.core.1", 2.0)]);
    }
}
