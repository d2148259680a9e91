//! Console appender
//!
//! `Error` and `Fatal` records go to stderr, everything else to stdout.

use super::format_line;
use crate::core::{Appender, LogEntry, Result};
use colored::Colorize;
use std::io::{self, Write};

pub struct ConsoleAppender {
    use_colors: bool,
}

impl ConsoleAppender {
    pub fn new() -> Self {
        Self { use_colors: true }
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn format_text(&self, entry: &LogEntry) -> String {
        let level = format!("{:5}", entry.level);
        if self.use_colors {
            format_line(entry, &level.color(entry.level.color()).to_string())
        } else {
            format_line(entry, &level)
        }
    }
}

impl Default for ConsoleAppender {
    fn default() -> Self {
        Self::new()
    }
}

impl Appender for ConsoleAppender {
    fn append(&mut self, entry: &LogEntry) -> Result<()> {
        let output = self.format_text(entry);
        // a closed pipe surfaces as an Err instead of a println! panic
        if entry.level.is_severe() {
            writeln!(io::stderr().lock(), "{}", output)?;
        } else {
            writeln!(io::stdout().lock(), "{}", output)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        io::stdout().flush()?;
        io::stderr().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogLevel;

    #[test]
    fn test_plain_text_has_no_escape_codes() {
        let appender = ConsoleAppender::with_colors(false);
        let entry = LogEntry::new(LogLevel::Info, "plain");
        let text = appender.format_text(&entry);

        assert!(text.contains("[INFO ]"));
        assert!(!text.contains('\u{1b}'));
    }

    #[test]
    fn test_append_and_flush_succeed() {
        let mut appender = ConsoleAppender::with_colors(false);
        appender
            .append(&LogEntry::new(LogLevel::Error, "to stderr"))
            .unwrap();
        appender.flush().unwrap();
    }
}
