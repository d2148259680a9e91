//! Discard-summary bookkeeping
//!
//! Records dropped on a full queue are not lost silently: they are counted
//! here and, as soon as a slot frees up, replaced by one synthesized
//! `ERROR` record telling downstream consumers how many were dropped.

use super::log_entry::LogEntry;
use super::log_level::LogLevel;

/// Whether a summary record is owed to the stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryState {
    Normal,
    PendingSummary,
}

/// Running count of discarded records since the last emitted summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscardSummary {
    count: u64,
    most_severe: Option<LogLevel>,
}

impl DiscardSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one dropped record; returns the new pending count
    pub fn add(&mut self, level: LogLevel) -> u64 {
        self.count += 1;
        self.most_severe = Some(self.most_severe.map_or(level, |prev| prev.max(level)));
        self.count
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Highest level among the records counted so far
    pub fn most_severe(&self) -> Option<LogLevel> {
        self.most_severe
    }

    pub fn state(&self) -> SummaryState {
        if self.count == 0 {
            SummaryState::Normal
        } else {
            SummaryState::PendingSummary
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state() == SummaryState::PendingSummary
    }

    /// Build the summary record and reset to `Normal`.
    ///
    /// Returns `None` when nothing was discarded.
    pub fn take(&mut self, logger_name: &str) -> Option<LogEntry> {
        if !self.is_pending() {
            return None;
        }
        let count = std::mem::take(&mut self.count);
        self.most_severe = None;
        Some(
            LogEntry::new(LogLevel::Error, summary_message(count))
                .with_logger_name(logger_name),
        )
    }
}

pub fn summary_message(count: u64) -> String {
    format!("{} records discarded", count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_until_first_discard() {
        let mut summary = DiscardSummary::new();
        assert_eq!(summary.state(), SummaryState::Normal);
        assert!(summary.take("async").is_none());

        summary.add(LogLevel::Debug);
        assert_eq!(summary.state(), SummaryState::PendingSummary);
    }

    #[test]
    fn test_take_builds_error_record_and_resets() {
        let mut summary = DiscardSummary::new();
        summary.add(LogLevel::Info);
        summary.add(LogLevel::Fatal);
        assert_eq!(summary.add(LogLevel::Debug), 3);
        assert_eq!(summary.most_severe(), Some(LogLevel::Fatal));

        let entry = summary.take("async").expect("summary pending");
        assert_eq!(entry.level, LogLevel::Error);
        assert_eq!(entry.message, "3 records discarded");
        assert_eq!(entry.logger_name, "async");
        assert!(entry.location.is_none());
        assert_eq!(entry.location_display(), "?:?");

        assert_eq!(summary, DiscardSummary::new());
    }
}
