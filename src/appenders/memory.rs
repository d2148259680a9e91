//! In-memory appender
//!
//! Keeps every record it receives. The appender itself is moved into an
//! async front, so inspection goes through a cloneable [`MemoryHandle`].

use crate::core::{Appender, LogEntry, LoggerError, Result};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct Shared {
    entries: Mutex<Vec<LogEntry>>,
    closed: AtomicBool,
    close_calls: AtomicUsize,
}

pub struct MemoryAppender {
    name: String,
    shared: Arc<Shared>,
}

impl MemoryAppender {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shared: Arc::new(Shared::default()),
        }
    }

    pub fn handle(&self) -> MemoryHandle {
        MemoryHandle {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl Appender for MemoryAppender {
    fn append(&mut self, entry: &LogEntry) -> Result<()> {
        if self.shared.closed.load(Ordering::Acquire) {
            return Err(LoggerError::closed(&self.name));
        }
        self.shared.entries.lock().push(entry.clone());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.shared.close_calls.fetch_add(1, Ordering::Relaxed);
        self.shared.closed.store(true, Ordering::Release);
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Read side of a [`MemoryAppender`]
#[derive(Debug, Clone)]
pub struct MemoryHandle {
    shared: Arc<Shared>,
}

impl MemoryHandle {
    pub fn entries(&self) -> Vec<LogEntry> {
        self.shared.entries.lock().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.shared
            .entries
            .lock()
            .iter()
            .map(|e| e.message.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.shared.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.entries.lock().is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }

    /// How many times `close()` was called on the appender
    pub fn close_calls(&self) -> usize {
        self.shared.close_calls.load(Ordering::Relaxed)
    }

    /// Close the appender from outside, as an independently managed
    /// destination would; later appends fail
    pub fn close(&self) {
        self.shared.closed.store(true, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogLevel;

    #[test]
    fn test_records_and_closes() {
        let mut appender = MemoryAppender::new("vector");
        let handle = appender.handle();

        appender.append(&LogEntry::new(LogLevel::Debug, "m1")).unwrap();
        appender.close().unwrap();

        assert_eq!(handle.messages(), vec!["m1"]);
        assert!(handle.is_closed());
        assert_eq!(handle.close_calls(), 1);
        assert!(matches!(
            appender.append(&LogEntry::new(LogLevel::Debug, "m2")),
            Err(LoggerError::AppenderClosed { .. })
        ));
        assert_eq!(handle.len(), 1);
    }

    #[test]
    fn test_external_close_fails_appends() {
        let mut appender = MemoryAppender::new("vector");
        let handle = appender.handle();
        handle.close();

        assert!(appender.append(&LogEntry::new(LogLevel::Info, "x")).is_err());
        assert!(handle.is_empty());
        assert_eq!(handle.close_calls(), 0);
    }
}
