//! Overflow policies for the async queue
//!
//! When the queue is full, the policy decides whether the submitting thread
//! waits for the dispatcher or the record is dropped and counted.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Policy for handling a full queue
///
/// # Example
///
/// ```
/// use rust_async_appender::OverflowPolicy;
///
/// // Default behavior: the caller waits for a free slot
/// assert_eq!(OverflowPolicy::default(), OverflowPolicy::Block);
///
/// // Drop and count, reported later as a summary record
/// let policy = OverflowPolicy::from_blocking(false);
/// assert_eq!(policy, OverflowPolicy::Discard);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Suspend the caller until the dispatcher frees a slot
    ///
    /// No record is lost, at the price of backpressure on application
    /// threads.
    #[default]
    Block,

    /// Drop the record and count it
    ///
    /// The count is delivered downstream as a single discard-summary record
    /// once space frees up.
    Discard,
}

impl OverflowPolicy {
    pub fn from_blocking(blocking: bool) -> Self {
        if blocking {
            OverflowPolicy::Block
        } else {
            OverflowPolicy::Discard
        }
    }

    pub fn is_blocking(&self) -> bool {
        matches!(self, OverflowPolicy::Block)
    }
}

impl fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverflowPolicy::Block => write!(f, "Block"),
            OverflowPolicy::Discard => write!(f, "Discard"),
        }
    }
}

/// Callback type for overflow notifications
///
/// Called from the submitting thread each time a record is discarded.
/// The parameter is the number of records discarded since the last
/// summary was emitted.
pub type OverflowCallback = Arc<dyn Fn(u64) + Send + Sync>;
