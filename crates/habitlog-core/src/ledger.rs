//! Append-only log ledger.
//!
//! One entry per explicit log event. Entries are never edited; they go away
//! only when their item is deleted.
//!
//! An entry records the increment the user asked for, not the delta that
//! survived clamping at the target. Summing a ledger therefore over-counts
//! whenever an item was logged while already near its target.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default size of the "recent logs" view.
pub const RECENT_LOG_LIMIT: usize = 50;

/// A persisted log event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: i64,
    pub item_id: i64,
    /// Requested increment (unclamped).
    pub amount: f64,
    pub logged_at: DateTime<Utc>,
}

/// A log event produced by [`Item::log`](crate::Item::log), not yet stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLogEntry {
    pub item_id: i64,
    pub amount: f64,
    pub logged_at: DateTime<Utc>,
}

impl NewLogEntry {
    pub(crate) fn stored(self, id: i64) -> LogEntry {
        LogEntry {
            id,
            item_id: self.item_id,
            amount: self.amount,
            logged_at: self.logged_at,
        }
    }
}

/// Sum of the recorded intents.
pub fn total_logged(entries: &[LogEntry]) -> f64 {
    entries.iter().map(|e| e.amount).sum()
}
