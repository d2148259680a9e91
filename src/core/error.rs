//! Error types for the async appender

use std::time::Duration;

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Record submitted after the front was closed
    #[error("Async appender '{name}' is closed; record rejected")]
    LoggerStopped { name: String },

    /// A destination appender failed while a record was forwarded to it
    #[error("Destination appender '{appender}' failed: {source}")]
    Destination {
        appender: String,
        #[source]
        source: Box<LoggerError>,
    },

    /// A destination appender panicked
    #[error("Destination appender '{appender}' panicked: {message}")]
    AppenderPanicked { appender: String, message: String },

    /// Append attempted on an appender that was already closed
    #[error("Appender '{name}' is closed")]
    AppenderClosed { name: String },

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// Dispatcher did not stop within the shutdown timeout
    #[error("Dispatcher for '{name}' did not stop within {timeout:?}; remaining records abandoned")]
    ShutdownTimeout { name: String, timeout: Duration },

    /// Dispatcher thread could not be spawned or panicked
    #[error("Dispatcher error: {0}")]
    DispatcherError(String),

    /// File lock error
    #[error("Failed to acquire file lock on '{path}'")]
    FileLockError { path: String },

    /// Writer error (generic)
    #[error("Writer error: {0}")]
    WriterError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    pub fn stopped(name: impl Into<String>) -> Self {
        LoggerError::LoggerStopped { name: name.into() }
    }

    /// Wrap an appender failure with the name of the failing destination
    pub fn destination(appender: impl Into<String>, source: LoggerError) -> Self {
        LoggerError::Destination {
            appender: appender.into(),
            source: Box::new(source),
        }
    }

    pub fn panicked(appender: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::AppenderPanicked {
            appender: appender.into(),
            message: message.into(),
        }
    }

    pub fn closed(name: impl Into<String>) -> Self {
        LoggerError::AppenderClosed { name: name.into() }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    pub fn shutdown_timeout(name: impl Into<String>, timeout: Duration) -> Self {
        LoggerError::ShutdownTimeout {
            name: name.into(),
            timeout,
        }
    }

    /// Create a file lock error
    pub fn file_lock(path: impl Into<String>) -> Self {
        LoggerError::FileLockError { path: path.into() }
    }

    /// Create a writer error (generic)
    pub fn writer<S: Into<String>>(msg: S) -> Self {
        LoggerError::WriterError(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }
}
