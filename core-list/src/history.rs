//! Per-position playback offsets.

use std::collections::HashMap;

/// Remembers where playback stopped for each adapter position.
#[derive(Debug, Clone, Default)]
pub struct HistoryCache {
    offsets: HashMap<usize, u64>,
}

impl HistoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `offset_ms` for `position`, replacing any earlier entry.
    pub fn record(&mut self, position: usize, offset_ms: u64) {
        self.offsets.insert(position, offset_ms);
    }

    pub fn get(&self, position: usize) -> Option<u64> {
        self.offsets.get(&position).copied()
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn clear(&mut self) {
        self.offsets.clear();
    }
}
