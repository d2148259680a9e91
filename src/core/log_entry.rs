//! Record snapshots
//!
//! A [`Record`] is what a caller hands to the async front: it borrows the
//! message payload and any attached error. [`LogEntry`] is the owned,
//! immutable snapshot that crosses the queue. Everything that could change
//! after the caller returns (message text, error chain, call site, thread)
//! is evaluated while the snapshot is built on the caller's thread.

use super::log_level::LogLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;

/// Placeholder rendered for location fields that were not captured
pub const UNKNOWN_LOCATION: &str = "?";

/// Logger name used when a record does not name one
pub const ROOT_LOGGER: &str = "root";

// Thread-local caches for thread information to avoid repeated allocations
thread_local! {
    static THREAD_ID_CACHE: RefCell<Option<String>> = const { RefCell::new(None) };
    static THREAD_NAME_CACHE: RefCell<Option<Option<String>>> = const { RefCell::new(None) };
}

/// Get cached thread ID, computing and caching it on first access
fn get_thread_id() -> String {
    THREAD_ID_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| format!("{:?}", std::thread::current().id()))
            .clone()
    })
}

/// Get cached thread name, computing and caching it on first access
fn get_thread_name() -> Option<String> {
    THREAD_NAME_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| std::thread::current().name().map(String::from))
            .clone()
    })
}

/// Call-site metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: u32,
    pub column: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_path: Option<String>,
}

impl Location {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
            module_path: None,
        }
    }

    #[must_use]
    pub fn with_module_path(mut self, module_path: impl Into<String>) -> Self {
        self.module_path = Some(module_path.into());
        self
    }

    /// Location of the function that called into a `#[track_caller]` chain
    pub fn from_caller(caller: &std::panic::Location<'_>) -> Self {
        Self::new(caller.file(), caller.line(), caller.column())
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// A record as supplied by the calling thread
///
/// The payload is borrowed; nothing is rendered until the record is
/// captured into a [`LogEntry`].
///
/// # Example
///
/// ```
/// use rust_async_appender::{LogLevel, Record};
///
/// let user = "alice";
/// let msg = format!("login from {}", user);
/// let record = Record::new(LogLevel::Info, &msg).logger("auth");
/// assert_eq!(record.level(), LogLevel::Info);
/// ```
#[derive(Clone, Copy)]
pub struct Record<'a> {
    level: LogLevel,
    logger_name: &'a str,
    message: &'a dyn fmt::Display,
    error: Option<&'a dyn std::error::Error>,
    location: Option<&'a Location>,
}

impl<'a> Record<'a> {
    pub fn new(level: LogLevel, message: &'a dyn fmt::Display) -> Self {
        Self {
            level,
            logger_name: ROOT_LOGGER,
            message,
            error: None,
            location: None,
        }
    }

    #[must_use]
    pub fn logger(mut self, name: &'a str) -> Self {
        self.logger_name = name;
        self
    }

    /// Attach an error; its `source()` chain is rendered at capture time
    #[must_use]
    pub fn error(mut self, error: &'a dyn std::error::Error) -> Self {
        self.error = Some(error);
        self
    }

    /// Use an explicit call site instead of the `#[track_caller]` one
    #[must_use]
    pub fn location(mut self, location: &'a Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn logger_name(&self) -> &str {
        self.logger_name
    }
}

impl fmt::Debug for Record<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("level", &self.level)
            .field("logger_name", &self.logger_name)
            .field("message", &format_args!("{}", self.message))
            .field("location", &self.location)
            .finish()
    }
}

/// Immutable snapshot of a record, safe to hand to any thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub logger_name: String,
    pub thread_id: String,
    pub thread_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: Utc::now(),
            logger_name: ROOT_LOGGER.to_string(),
            thread_id: get_thread_id(),
            thread_name: get_thread_name(),
            location: None,
            error: None,
        }
    }

    /// Freeze a caller's record.
    ///
    /// Must run on the submitting thread: the message is rendered now and
    /// the call site (`caller`, unless the record carries its own) is only
    /// kept when `location_info` is set.
    pub fn capture(
        record: &Record<'_>,
        location_info: bool,
        caller: &std::panic::Location<'_>,
    ) -> Self {
        let mut entry = Self::new(record.level, record.message.to_string());
        entry.logger_name = record.logger_name.to_string();
        entry.error = record.error.map(render_error_chain);
        if location_info {
            entry.location = Some(
                record
                    .location
                    .cloned()
                    .unwrap_or_else(|| Location::from_caller(caller)),
            );
        }
        entry
    }

    pub fn with_location(mut self, file: &str, line: u32, module_path: &str) -> Self {
        self.location = Some(Location::new(file, line, 0).with_module_path(module_path));
        self
    }

    pub fn with_logger_name(mut self, name: impl Into<String>) -> Self {
        self.logger_name = name.into();
        self
    }

    pub fn with_error(mut self, error: &dyn std::error::Error) -> Self {
        self.error = Some(render_error_chain(error));
        self
    }

    pub fn location_file(&self) -> &str {
        self.location
            .as_ref()
            .map_or(UNKNOWN_LOCATION, |loc| loc.file.as_str())
    }

    pub fn location_line(&self) -> String {
        self.location
            .as_ref()
            .map_or_else(|| UNKNOWN_LOCATION.to_string(), |loc| loc.line.to_string())
    }

    /// `file:line`, or `?:?` when no location was captured
    pub fn location_display(&self) -> String {
        format!("{}:{}", self.location_file(), self.location_line())
    }
}

fn render_error_chain(error: &dyn std::error::Error) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Shared(Mutex<String>);

    impl fmt::Display for Shared {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let text = self.0.lock().map_err(|_| fmt::Error)?;
            f.write_str(&text)
        }
    }

    #[test]
    fn test_capture_freezes_message() {
        let buf = Shared(Mutex::new("Hello".to_string()));
        let record = Record::new(LogLevel::Info, &buf);
        let entry = LogEntry::capture(&record, false, std::panic::Location::caller());

        buf.0.lock().unwrap().push_str(", World.");

        assert_eq!(entry.message, "Hello");
        assert_eq!(buf.to_string(), "Hello, World.");
    }

    #[test]
    fn test_capture_location_only_when_enabled() {
        let msg = "located";
        let record = Record::new(LogLevel::Debug, &msg);
        let here = std::panic::Location::caller();

        let with = LogEntry::capture(&record, true, here);
        let location = with.location.as_ref().expect("location captured");
        assert_eq!(location.file, here.file());
        assert_eq!(location.line, here.line());

        let without = LogEntry::capture(&record, false, here);
        assert!(without.location.is_none());
        assert_eq!(without.location_display(), "?:?");
    }

    #[test]
    fn test_explicit_location_wins() {
        let msg = "from macro";
        let explicit = Location::new("src/service.rs", 42, 9).with_module_path("app::service");
        let record = Record::new(LogLevel::Warn, &msg).location(&explicit);

        let entry = LogEntry::capture(&record, true, std::panic::Location::caller());
        assert_eq!(entry.location, Some(explicit));
        assert_eq!(entry.location_display(), "src/service.rs:42");
    }

    #[test]
    fn test_error_chain_rendered() {
        let inner = std::io::Error::new(std::io::ErrorKind::Other, "disk unplugged");
        let outer = crate::core::LoggerError::io_operation("flushing", "flush failed", inner);
        let msg = "write failed";
        let record = Record::new(LogLevel::Error, &msg)
            .logger("storage")
            .error(&outer);

        let entry = LogEntry::capture(&record, false, std::panic::Location::caller());
        assert_eq!(entry.logger_name, "storage");
        assert_eq!(
            entry.error.as_deref(),
            Some("IO error while flushing: flush failed: disk unplugged")
        );
    }

    #[test]
    fn test_thread_info_captured() {
        let entry = std::thread::Builder::new()
            .name("producer-7".into())
            .spawn(|| LogEntry::new(LogLevel::Info, "hi"))
            .unwrap()
            .join()
            .unwrap();

        assert_eq!(entry.thread_name.as_deref(), Some("producer-7"));
        assert!(!entry.thread_id.is_empty());
    }
}
