//! # Rust Async Appender
//!
//! Asynchronous log dispatch: application threads hand records to an
//! [`AsyncAppender`], which snapshots them, buffers them in a bounded queue
//! and lets a single background dispatcher forward them to destination
//! appenders.
//!
//! ## Features
//!
//! - **Eager snapshots**: message text and call site are captured on the
//!   calling thread, before the record is queued
//! - **Bounded queue**: block the caller on a full queue, or discard and
//!   report the gap with a summary record
//! - **Failure isolation**: a failing or panicking destination never stops
//!   delivery to the others
//! - **Orderly shutdown**: `close()` delivers everything accepted before it
//!   was called, then closes the destinations
//!
//! ```
//! use rust_async_appender::prelude::*;
//!
//! let memory = MemoryAppender::new("memory");
//! let records = memory.handle();
//!
//! let front = AsyncAppender::builder()
//!     .buffer_size(64)
//!     .appender(memory)
//!     .start()
//!     .unwrap();
//!
//! front.info("service started");
//! front.close();
//!
//! assert_eq!(records.messages(), vec!["service started"]);
//! ```

pub mod appenders;
pub mod core;
pub mod macros;

pub mod prelude {
    #[cfg(feature = "console")]
    pub use crate::appenders::ConsoleAppender;
    #[cfg(feature = "file")]
    pub use crate::appenders::FileAppender;
    pub use crate::appenders::{MemoryAppender, MemoryHandle};
    pub use crate::core::{
        Appender, AsyncAppender, AsyncAppenderBuilder, AsyncAppenderConfig, DispatchMetrics,
        DispatcherState, ErrorSink, FallbackErrorSink, Location, LogEntry, LogLevel, LoggerError,
        NullErrorSink, OverflowCallback, OverflowPolicy, Record, Result, StderrErrorSink,
        DEFAULT_SHUTDOWN_TIMEOUT,
    };
}

#[cfg(feature = "console")]
pub use appenders::ConsoleAppender;
#[cfg(feature = "file")]
pub use appenders::FileAppender;
pub use appenders::{MemoryAppender, MemoryHandle};
pub use core::{
    Appender, AsyncAppender, AsyncAppenderBuilder, AsyncAppenderConfig, BoundedQueue,
    DiscardSummary, DispatchMetrics, DispatcherState, EnqueueOutcome, ErrorSink,
    FallbackErrorSink, Location, LogEntry, LogLevel, LoggerError, NullErrorSink,
    OverflowCallback, OverflowPolicy, Record, Result, StderrErrorSink, DEFAULT_BUFFER_SIZE,
    DEFAULT_SHUTDOWN_TIMEOUT, UNKNOWN_LOCATION,
};
