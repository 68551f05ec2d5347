//! The public game log: an append-only list of timestamped lines.

use std::fmt;

use chrono::{DateTime, Local};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub at: DateTime<Local>,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.at.format("%H:%M:%S"), self.message)
    }
}

/// Grows without bound; readers are expected to look at a recent suffix.
#[derive(Debug, Clone, Default)]
pub struct GameLog {
    entries: Vec<LogEntry>,
}

impl GameLog {
    pub fn push(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(%message, "game log");
        self.entries.push(LogEntry {
            at: Local::now(),
            message,
        });
    }

    /// The last `n` entries, rendered, oldest first.
    pub fn recent(&self, n: usize) -> Vec<String> {
        let start = self.entries.len().saturating_sub(n);
        self.entries[start..].iter().map(ToString::to_string).collect()
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn last_message(&self) -> Option<&str> {
        self.entries.last().map(|e| e.message.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_returns_suffix_in_order() {
        let mut log = GameLog::default();
        for i in 0..5 {
            log.push(format!("line {i}"));
        }
        let recent = log.recent(2);
        assert_eq!(recent.len(), 2);
        assert!(recent[0].ends_with("line 3"));
        assert!(recent[1].ends_with("line 4"));
        assert_eq!(log.recent(50).len(), 5);
    }

    #[test]
    fn test_entry_format() {
        let mut log = GameLog::default();
        log.push("hello");
        let line = &log.recent(1)[0];
        // "[HH:MM:SS] hello"
        assert_eq!(line.len(), "[00:00:00] hello".len());
        assert!(line.starts_with('['));
        assert_eq!(log.last_message(), Some("hello"));
    }
}
