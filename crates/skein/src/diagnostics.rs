//! A bounded record of frames the client had to drop.

use std::collections::VecDeque;

/// One dropped frame and why it was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub frame: String,
    pub error: String,
}

/// Ring buffer of the most recent [`Diagnostic`]s.
///
/// When full, recording a new entry evicts the oldest one.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    entries: VecDeque<Diagnostic>,
    capacity: usize,
    dropped_total: u64,
}

impl Diagnostics {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            dropped_total: 0,
        }
    }

    /// Records a dropped frame.
    pub fn record(&mut self, frame: impl Into<String>, error: impl ToString) {
        self.dropped_total += 1;
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(Diagnostic {
            frame: frame.into(),
            error: error.to_string(),
        });
    }

    /// Retained entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&Diagnostic> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Frames dropped since creation, including evicted ones.
    pub fn dropped_total(&self) -> u64 {
        self.dropped_total
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
