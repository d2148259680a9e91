//! Appender implementations

#[cfg(feature = "console")]
pub mod console;
#[cfg(feature = "file")]
pub mod file;
pub mod memory;

#[cfg(feature = "console")]
pub use console::ConsoleAppender;
#[cfg(feature = "file")]
pub use file::FileAppender;
pub use memory::{MemoryAppender, MemoryHandle};

// Re-exported so destinations can implement it from here
pub use crate::core::Appender;

use crate::core::LogEntry;
use chrono::SecondsFormat;

/// Plain one-line rendering shared by the text appenders:
/// `[timestamp] [LEVEL] [thread] logger - message (file:line) | error`
pub(crate) fn format_line(entry: &LogEntry, level: &str) -> String {
    let mut line = format!(
        "[{}] [{}] [{}] {} - {}",
        entry.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        level,
        entry.thread_name.as_ref().unwrap_or(&entry.thread_id),
        entry.logger_name,
        entry.message
    );

    if entry.location.is_some() {
        line.push_str(&format!(" ({})", entry.location_display()));
    }
    if let Some(ref error) = entry.error {
        line.push_str(" | ");
        line.push_str(error);
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogLevel;

    #[test]
    fn test_format_line_parts() {
        let entry = LogEntry::new(LogLevel::Warn, "disk at 91%")
            .with_logger_name("storage")
            .with_location("src/disk.rs", 12, "app::disk");
        let line = format_line(&entry, entry.level.as_str());

        assert!(line.contains("[WARN]"));
        assert!(line.contains("storage - disk at 91%"));
        assert!(line.ends_with("(src/disk.rs:12)"));
    }

    #[test]
    fn test_format_line_without_location() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let entry = LogEntry::new(LogLevel::Error, "open failed").with_error(&err);
        let line = format_line(&entry, "ERROR");

        assert!(!line.contains("?:?"));
        assert!(line.ends_with("open failed | missing"));
    }
}
