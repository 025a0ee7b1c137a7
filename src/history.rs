// Bounded rolling history, one FIFO series per tracked field

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

use crate::models::MetricSample;

pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPoint {
    pub timestamp: u64,
    pub value: f64,
}

/// Oldest point first. Never holds more than `capacity` points.
#[derive(Debug, Clone)]
pub struct HistorySeries {
    capacity: usize,
    points: VecDeque<HistoryPoint>,
}

impl HistorySeries {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            points: VecDeque::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> impl ExactSizeIterator<Item = &HistoryPoint> + DoubleEndedIterator {
        self.points.iter()
    }

    pub fn latest(&self) -> Option<&HistoryPoint> {
        self.points.back()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn to_vec(&self) -> Vec<HistoryPoint> {
        self.points.iter().copied().collect()
    }

    /// Appends one point, evicting the head first when full.
    /// Returns false without touching the series for a non-finite value
    /// or a timestamp older than the newest point.
    pub fn append(&mut self, timestamp: u64, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        if let Some(last) = self.points.back()
            && timestamp < last.timestamp
        {
            return false;
        }
        if self.points.len() >= self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(HistoryPoint { timestamp, value });
        true
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// True when more than `window` points are held and the last `window`
    /// values rise strictly from one to the next.
    pub fn is_strictly_increasing(&self, window: usize) -> bool {
        if window == 0 || self.points.len() <= window {
            return false;
        }
        let start = self.points.len() - window;
        (start + 1..self.points.len()).all(|i| self.points[i].value > self.points[i - 1].value)
    }
}

/// Named series sharing one capacity. Callers serialize access; there is no locking here.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    capacity: usize,
    series: BTreeMap<String, HistorySeries>,
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HistoryBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            series: BTreeMap::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn append(&mut self, name: &str, timestamp: u64, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        match self.series.get_mut(name) {
            Some(series) => series.append(timestamp, value),
            None => {
                let mut series = HistorySeries::new(self.capacity);
                let appended = series.append(timestamp, value);
                self.series.insert(name.to_string(), series);
                appended
            }
        }
    }

    /// Appends every tracked field the sample holds. Returns how many points were added.
    pub fn append_sample<S: AsRef<str>>(&mut self, sample: &MetricSample, tracked: &[S]) -> usize {
        tracked
            .iter()
            .filter_map(|name| {
                let name = name.as_ref();
                sample.get(name).map(|v| (name, v))
            })
            .filter(|(name, v)| self.append(name, sample.timestamp(), *v))
            .count()
    }

    pub fn series_for(&self, name: &str) -> Option<&HistorySeries> {
        self.series.get(name)
    }

    pub fn series_names(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn snapshot(&self) -> BTreeMap<String, Vec<HistoryPoint>> {
        self.series
            .iter()
            .map(|(name, s)| (name.clone(), s.to_vec()))
            .collect()
    }

    /// Empties every series. Capacities and series names stay.
    pub fn reset(&mut self) {
        for series in self.series.values_mut() {
            series.clear();
        }
    }
}
