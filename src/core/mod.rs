//! Core dispatch types and traits

pub mod appender;
pub mod async_appender;
pub mod bounded_queue;
pub mod config;
pub mod discard_summary;
pub mod dispatcher;
pub mod error;
pub mod error_sink;
pub mod log_entry;
pub mod log_level;
pub mod metrics;
pub mod overflow_policy;

pub use appender::Appender;
pub use async_appender::{
    AsyncAppender, AsyncAppenderBuilder, DEFAULT_BUFFER_SIZE, DEFAULT_SHUTDOWN_TIMEOUT,
};
pub use bounded_queue::{BoundedQueue, EnqueueOutcome};
pub use config::AsyncAppenderConfig;
pub use discard_summary::{DiscardSummary, SummaryState};
pub use dispatcher::{Dispatcher, DispatcherHandle, DispatcherState};
pub use error::{LoggerError, Result};
pub use error_sink::{ErrorSink, FallbackErrorSink, NullErrorSink, StderrErrorSink};
pub use log_entry::{Location, LogEntry, Record, ROOT_LOGGER, UNKNOWN_LOCATION};
pub use log_level::{LogLevel, ParseLevelError};
pub use metrics::DispatchMetrics;
pub use overflow_policy::{OverflowCallback, OverflowPolicy};
