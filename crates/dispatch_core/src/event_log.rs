//! Append-only session event log.
//!
//! Every phase transition, negotiation outcome, traffic event and milestone
//! crossing appends exactly one entry. Overlapping tick callbacks may try to
//! append the same message twice in a row; `append` suppresses exact
//! consecutive duplicates so the log stays idempotent under that race.

use bevy_ecs::prelude::Resource;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct EventLogEntry {
    pub timestamp_ms: u64,
    pub message: String,
}

#[derive(Debug, Default, Resource)]
pub struct EventLog {
    entries: Vec<EventLogEntry>,
}

impl EventLog {
    /// Appends an entry unless it would exactly duplicate the previous
    /// message. Returns whether the entry was recorded.
    pub fn append(&mut self, timestamp_ms: u64, message: impl Into<String>) -> bool {
        let message = message.into();
        if self.entries.last().map(|e| e.message.as_str()) == Some(message.as_str()) {
            return false;
        }
        self.entries.push(EventLogEntry {
            timestamp_ms,
            message,
        });
        true
    }

    pub fn entries(&self) -> &[EventLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Last `n` entries, oldest first.
    pub fn tail(&self, n: usize) -> &[EventLogEntry] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.entries.iter().any(|e| e.message.contains(needle))
    }

    pub fn count_containing(&self, needle: &str) -> usize {
        self.entries
            .iter()
            .filter(|e| e.message.contains(needle))
            .count()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_preserves_order() {
        let mut log = EventLog::default();
        assert!(log.append(1, "first"));
        assert!(log.append(2, "second"));
        assert_eq!(log.len(), 2);
        assert_eq!(log.entries()[0].message, "first");
        assert_eq!(log.entries()[1].timestamp_ms, 2);
    }

    #[test]
    fn consecutive_duplicates_are_suppressed() {
        let mut log = EventLog::default();
        assert!(log.append(1, "halfway there"));
        assert!(!log.append(2, "halfway there"));
        assert_eq!(log.len(), 1);
        // The same message is allowed again once something else intervened.
        assert!(log.append(3, "other"));
        assert!(log.append(4, "halfway there"));
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn tail_returns_most_recent() {
        let mut log = EventLog::default();
        for i in 0..5 {
            log.append(i, format!("entry {i}"));
        }
        let tail = log.tail(2);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].message, "entry 3");
        assert_eq!(tail[1].message, "entry 4");
        assert_eq!(log.tail(10).len(), 5);
    }
}
