//! Recent evaluation history
//!
//! A bounded, most-recent-first buffer of evaluation results. Writers build a
//! new sequence and swap it in, so a reader holding a snapshot never sees a
//! half-applied insert.

use crate::metrics::EvaluationResult;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// Number of results kept
pub const HISTORY_CAPACITY: usize = 10;

/// Immutable view of the history at one point in time
pub type HistorySnapshot = Arc<[Arc<EvaluationResult>]>;

#[derive(Debug)]
pub struct HistoryStore {
    entries: RwLock<HistorySnapshot>,
    capacity: usize,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    /// Capacity is at least one
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(Arc::from(Vec::new())),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Prepends `result`, dropping the oldest entry once full
    pub fn record(&self, result: Arc<EvaluationResult>) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);

        let mut next = Vec::with_capacity(self.capacity);
        next.push(result);
        next.extend(entries.iter().take(self.capacity - 1).cloned());

        if entries.len() >= self.capacity {
            if let Some(evicted) = entries.last() {
                debug!(evicted = %evicted.id(), "History full, evicting oldest result");
            }
        }

        *entries = Arc::from(next);
    }

    /// Entry at `index`, 0 being the most recent
    pub fn select(&self, index: usize) -> Option<Arc<EvaluationResult>> {
        self.snapshot().get(index).cloned()
    }

    pub fn snapshot(&self) -> HistorySnapshot {
        Arc::clone(&self.entries.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        *self.entries.write().unwrap_or_else(PoisonError::into_inner) = Arc::from(Vec::new());
    }
}
