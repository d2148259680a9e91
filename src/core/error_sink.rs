//! Error-reporting sinks
//!
//! The dispatcher never propagates destination failures back to producer
//! threads. They are handed to an [`ErrorSink`] instead.

use super::{appender::Appender, error::LoggerError, log_entry::LogEntry};
use parking_lot::Mutex;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Receiver of operational errors raised while dispatching records
pub trait ErrorSink: Send + Sync {
    /// `entry` is the record being forwarded when the failure happened, if any
    fn report(&self, context: &str, error: &LoggerError, entry: Option<&LogEntry>);
}

/// Writes errors to stderr with the `[LOGGER ERROR]` prefix
///
/// In only-once mode the first error is printed and every later one is
/// swallowed, which keeps a permanently broken destination from flooding
/// stderr.
#[derive(Debug, Default)]
pub struct StderrErrorSink {
    only_once: bool,
    reported: AtomicBool,
}

impl StderrErrorSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn only_once() -> Self {
        Self {
            only_once: true,
            reported: AtomicBool::new(false),
        }
    }
}

impl ErrorSink for StderrErrorSink {
    fn report(&self, context: &str, error: &LoggerError, _entry: Option<&LogEntry>) {
        if self.only_once && self.reported.swap(true, Ordering::Relaxed) {
            return;
        }
        eprintln!("[LOGGER ERROR] {}: {}", context, error);
    }
}

/// Discards every report
#[derive(Debug, Default, Clone, Copy)]
pub struct NullErrorSink;

impl ErrorSink for NullErrorSink {
    fn report(&self, _context: &str, _error: &LoggerError, _entry: Option<&LogEntry>) {}
}

/// Re-routes the record of a failed append to a backup appender
///
/// The failure itself is still passed on to the inner sink. If the backup
/// also fails, that failure is reported as well.
pub struct FallbackErrorSink {
    backup: Mutex<Box<dyn Appender>>,
    inner: Arc<dyn ErrorSink>,
}

impl FallbackErrorSink {
    pub fn new(backup: Box<dyn Appender>) -> Self {
        Self::with_inner(backup, Arc::new(StderrErrorSink::new()))
    }

    pub fn with_inner(backup: Box<dyn Appender>, inner: Arc<dyn ErrorSink>) -> Self {
        Self {
            backup: Mutex::new(backup),
            inner,
        }
    }

    /// Close the backup appender
    pub fn close(&self) -> crate::core::Result<()> {
        self.backup.lock().close()
    }
}

impl ErrorSink for FallbackErrorSink {
    fn report(&self, context: &str, error: &LoggerError, entry: Option<&LogEntry>) {
        self.inner.report(context, error, entry);

        let Some(entry) = entry else {
            return;
        };
        let mut backup = self.backup.lock();
        // runs on the dispatcher thread: a panicking backup must not take it down
        let err = match catch_unwind(AssertUnwindSafe(|| backup.append(entry))) {
            Ok(Ok(())) => return,
            Ok(Err(e)) => LoggerError::destination(backup.name().to_string(), e),
            Err(panic) => LoggerError::panicked(backup.name().to_string(), panic_message(panic)),
        };
        self.inner.report("fallback appender failed", &err, Some(entry));
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(s) => *s,
        Err(panic) => panic
            .downcast_ref::<&str>()
            .map_or_else(|| "Unknown panic".to_string(), |s| s.to_string()),
    }
}
