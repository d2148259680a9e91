//! Logging macros for ergonomic record submission.
//!
//! These macros format like `println!`, use the calling module as the
//! logger name, and carry the exact call site (file, line, column and
//! module path). The call site is kept only if the front has location
//! capture enabled.
//!
//! # Examples
//!
//! ```
//! use rust_async_appender::prelude::*;
//! use rust_async_appender::info;
//!
//! let front = AsyncAppender::builder().start().unwrap();
//!
//! // Basic logging
//! info!(front, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(front, "Server listening on port {}", port);
//!
//! front.close();
//! ```

/// Submit a record at the given level.
///
/// # Examples
///
/// ```
/// # use rust_async_appender::prelude::*;
/// # let front = AsyncAppender::builder().start().unwrap();
/// use rust_async_appender::log;
/// log!(front, LogLevel::Info, "Simple message");
/// log!(front, LogLevel::Error, "Error code: {}", 500);
/// ```
#[macro_export]
macro_rules! log {
    ($front:expr, $level:expr, $($arg:tt)+) => {{
        let __location = $crate::Location::new(file!(), line!(), column!())
            .with_module_path(module_path!());
        $front.submit(
            $crate::Record::new($level, &format_args!($($arg)+))
                .logger(module_path!())
                .location(&__location),
        );
    }};
}

/// Submit a trace-level record.
#[macro_export]
macro_rules! trace {
    ($front:expr, $($arg:tt)+) => {
        $crate::log!($front, $crate::LogLevel::Trace, $($arg)+)
    };
}

/// Submit a debug-level record.
#[macro_export]
macro_rules! debug {
    ($front:expr, $($arg:tt)+) => {
        $crate::log!($front, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Submit an info-level record.
///
/// # Examples
///
/// ```
/// # use rust_async_appender::prelude::*;
/// # let front = AsyncAppender::builder().start().unwrap();
/// use rust_async_appender::info;
/// info!(front, "Application started");
/// info!(front, "Processing {} items", 100);
/// ```
#[macro_export]
macro_rules! info {
    ($front:expr, $($arg:tt)+) => {
        $crate::log!($front, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Submit a warning-level record.
#[macro_export]
macro_rules! warn {
    ($front:expr, $($arg:tt)+) => {
        $crate::log!($front, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Submit an error-level record.
///
/// # Examples
///
/// ```
/// # use rust_async_appender::prelude::*;
/// # let front = AsyncAppender::builder().start().unwrap();
/// use rust_async_appender::error;
/// error!(front, "Failed to connect to database");
/// error!(front, "Error code: {}, message: {}", 500, "Internal error");
/// ```
#[macro_export]
macro_rules! error {
    ($front:expr, $($arg:tt)+) => {
        $crate::log!($front, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Submit a fatal-level record.
#[macro_export]
macro_rules! fatal {
    ($front:expr, $($arg:tt)+) => {
        $crate::log!($front, $crate::LogLevel::Fatal, $($arg)+)
    };
}
