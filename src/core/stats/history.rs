use std::collections::VecDeque;

use super::metrics::{MetricKind, Sample};
use crate::error::{Result, StatError};

/// Bounded FIFO of samples for one metric.
///
/// Never holds more than `capacity` entries; a push into a full series drops
/// the oldest entry first.
#[derive(Debug, Clone)]
pub struct MetricSeries<T> {
    capacity: usize,
    values: VecDeque<T>,
}

impl<T> MetricSeries<T> {
    /// A capacity of zero is rejected.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(StatError::config("points per stat must be at least 1"));
        }

        Ok(Self {
            capacity,
            values: VecDeque::with_capacity(capacity),
        })
    }

    pub fn push(&mut self, value: T) {
        if self.values.len() >= self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    pub fn latest(&self) -> Option<&T> {
        self.values.back()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.values.iter()
    }
}

/// One series per [`MetricKind`].
///
/// The store itself does no locking; it lives behind the service mutex and
/// every method assumes the caller holds it.
#[derive(Debug, Clone)]
pub struct MetricStore {
    series: [MetricSeries<Sample>; MetricKind::COUNT],
    appended: [u64; MetricKind::COUNT],
}

impl MetricStore {
    /// Create a store retaining at most `capacity` samples per metric.
    ///
    /// A capacity of zero is rejected.
    pub fn new(capacity: usize) -> Result<Self> {
        let empty = MetricSeries::with_capacity(capacity)?;

        Ok(Self {
            series: std::array::from_fn(|_| empty.clone()),
            appended: [0; MetricKind::COUNT],
        })
    }

    /// Append a sample to the series of its own kind, evicting the oldest
    /// entry when that series is full.
    pub fn append(&mut self, sample: Sample) {
        let kind = sample.kind();
        self.series[kind.index()].push(sample);
        self.appended[kind.index()] += 1;
    }

    /// Number of samples ever appended for `kind`. Grows with every append,
    /// so a larger value always means a newer latest sample.
    pub fn generation(&self, kind: MetricKind) -> u64 {
        self.appended[kind.index()]
    }

    pub fn latest(&self, kind: MetricKind) -> Option<&Sample> {
        self.series[kind.index()].latest()
    }

    /// Full in-memory history for `kind`, oldest first
    pub fn snapshot(&self, kind: MetricKind) -> Vec<Sample> {
        self.series[kind.index()].iter().cloned().collect()
    }

    pub fn len(&self, kind: MetricKind) -> usize {
        self.series[kind.index()].len()
    }

    pub fn is_empty(&self, kind: MetricKind) -> bool {
        self.series[kind.index()].is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.series[0].capacity()
    }
}
