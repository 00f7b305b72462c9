//! Search history of performed lookups.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Module tag for dosage calculations.
pub const DOSAGE_MODULE: &str = "dosage-calc";

/// Capacity of [`SearchHistory::new`].
pub const DEFAULT_HISTORY_CAPACITY: usize = 1000;

/// One recorded lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub id: Uuid,
    /// Feature the lookup came from (e.g. "dosage-calc")
    pub module: String,
    /// Human-readable summary of what was asked
    pub query: String,
    pub user: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Thread-safe history log holding at most `capacity` entries.
///
/// Once full, each new entry evicts the oldest one.
#[derive(Debug)]
pub struct SearchHistory {
    entries: Mutex<VecDeque<HistoryEntry>>,
    capacity: usize,
}

impl Default for SearchHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl SearchHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a log keeping the `capacity` most recent entries (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity.min(64))),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // Poisoning is ignored: every mutation leaves the deque consistent.
    fn lock(&self) -> MutexGuard<'_, VecDeque<HistoryEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append an entry and return it, evicting the oldest entry when full.
    pub fn record(&self, module: &str, query: String, user: Option<String>) -> HistoryEntry {
        let entry = HistoryEntry {
            id: Uuid::new_v4(),
            module: module.to_string(),
            query,
            user,
            created_at: Utc::now(),
        };
        let mut entries = self.lock();
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry.clone());
        entry
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.lock().iter().cloned().collect()
    }

    /// Entries recorded for `user`, newest first.
    pub fn entries_for(&self, user: &str) -> Vec<HistoryEntry> {
        self.lock()
            .iter()
            .rev()
            .filter(|e| e.user.as_deref() == Some(user))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}
