//! Per-attempt request timing

use chrono::{DateTime, Utc};

/// Wall-clock span of a single transport attempt
#[derive(Debug, Clone, PartialEq)]
pub struct TimingRecord {
    /// `"<METHOD> <path>"`
    pub label: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimingRecord {
    pub fn elapsed(&self) -> chrono::Duration {
        self.end - self.start
    }
}

/// Append-only log of timing records
#[derive(Debug, Default)]
pub struct TimingLog {
    records: Vec<TimingRecord>,
}

impl TimingLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, label: String, start: DateTime<Utc>, end: DateTime<Utc>) {
        self.records.push(TimingRecord { label, start, end });
    }

    pub fn records(&self) -> &[TimingRecord] {
        &self.records
    }

    pub fn reset(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
