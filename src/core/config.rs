//! Serializable configuration for an async front
//!
//! Only the front's own settings live here. Building the destination graph
//! from a configuration source is left to the caller, who adds appenders
//! to the builder returned by [`AsyncAppenderConfig::into_builder`].

use super::async_appender::{AsyncAppenderBuilder, DEFAULT_BUFFER_SIZE};
use super::error::{LoggerError, Result};
use super::overflow_policy::OverflowPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// # Example
///
/// ```
/// use rust_async_appender::AsyncAppenderConfig;
///
/// let config = AsyncAppenderConfig::from_json(
///     r#"{ "name": "audit", "buffer_size": 5, "blocking": false }"#,
/// ).unwrap();
///
/// assert_eq!(config.buffer_size, 5);
/// assert!(!config.location_info);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AsyncAppenderConfig {
    pub name: String,
    pub buffer_size: usize,
    pub blocking: bool,
    pub location_info: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shutdown_timeout_ms: Option<u64>,
}

impl Default for AsyncAppenderConfig {
    fn default() -> Self {
        Self {
            name: "async".to_string(),
            buffer_size: DEFAULT_BUFFER_SIZE,
            blocking: true,
            location_info: false,
            shutdown_timeout_ms: None,
        }
    }
}

impl AsyncAppenderConfig {
    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.buffer_size == 0 {
            return Err(LoggerError::config(
                "AsyncAppender",
                "buffer_size must be at least 1",
            ));
        }
        if self.name.trim().is_empty() {
            return Err(LoggerError::config("AsyncAppender", "name must not be empty"));
        }
        Ok(())
    }

    pub fn overflow_policy(&self) -> OverflowPolicy {
        OverflowPolicy::from_blocking(self.blocking)
    }

    pub fn shutdown_timeout(&self) -> Option<Duration> {
        self.shutdown_timeout_ms.map(Duration::from_millis)
    }

    pub fn into_builder(self) -> Result<AsyncAppenderBuilder> {
        AsyncAppenderBuilder::from_config(&self)
    }
}
