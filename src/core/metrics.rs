//! Dispatch metrics for observability
//!
//! Counters for monitoring the health of an async front: how many records
//! went in, how many reached the destinations, and how many were lost and
//! why.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for an async front and its dispatcher
///
/// # Example
///
/// ```
/// use rust_async_appender::DispatchMetrics;
///
/// let metrics = DispatchMetrics::new();
///
/// metrics.record_enqueued();
/// metrics.record_discarded();
///
/// assert_eq!(metrics.enqueued(), 1);
/// assert_eq!(metrics.discarded(), 1);
/// ```
#[derive(Debug)]
pub struct DispatchMetrics {
    /// Records accepted into the queue
    enqueued: AtomicU64,

    /// Records handed to every destination by the dispatcher
    dispatched: AtomicU64,

    /// Records dropped because the queue was full
    discarded: AtomicU64,

    /// Records submitted after close
    rejected: AtomicU64,

    /// Number of times a producer had to wait for queue space
    block_events: AtomicU64,

    /// Failed or panicking destination calls
    destination_errors: AtomicU64,

    /// Discard-summary records synthesized
    summaries_emitted: AtomicU64,
}

impl DispatchMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            enqueued: AtomicU64::new(0),
            dispatched: AtomicU64::new(0),
            discarded: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            block_events: AtomicU64::new(0),
            destination_errors: AtomicU64::new(0),
            summaries_emitted: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn enqueued(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn discarded(&self) -> u64 {
        self.discarded.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn block_events(&self) -> u64 {
        self.block_events.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn destination_errors(&self) -> u64 {
        self.destination_errors.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn summaries_emitted(&self) -> u64 {
        self.summaries_emitted.load(Ordering::Relaxed)
    }

    /// Record an accepted record; returns the previous value
    #[inline]
    pub fn record_enqueued(&self) -> u64 {
        self.enqueued.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_dispatched(&self) -> u64 {
        self.dispatched.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_discarded(&self) -> u64 {
        self.discarded.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_rejected(&self) -> u64 {
        self.rejected.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_block(&self) -> u64 {
        self.block_events.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_destination_error(&self) -> u64 {
        self.destination_errors.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_summary(&self) -> u64 {
        self.summaries_emitted.fetch_add(1, Ordering::Relaxed)
    }

    /// Discard rate as a percentage (0.0 - 100.0) of everything submitted
    /// while open
    ///
    /// Returns 0.0 if nothing has been submitted.
    pub fn discard_rate(&self) -> f64 {
        let discarded = self.discarded() as f64;
        let total = self.enqueued() as f64 + discarded;
        if total == 0.0 {
            0.0
        } else {
            (discarded / total) * 100.0
        }
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.enqueued.store(0, Ordering::Relaxed);
        self.dispatched.store(0, Ordering::Relaxed);
        self.discarded.store(0, Ordering::Relaxed);
        self.rejected.store(0, Ordering::Relaxed);
        self.block_events.store(0, Ordering::Relaxed);
        self.destination_errors.store(0, Ordering::Relaxed);
        self.summaries_emitted.store(0, Ordering::Relaxed);
    }
}

impl Default for DispatchMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for DispatchMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            enqueued: AtomicU64::new(self.enqueued()),
            dispatched: AtomicU64::new(self.dispatched()),
            discarded: AtomicU64::new(self.discarded()),
            rejected: AtomicU64::new(self.rejected()),
            block_events: AtomicU64::new(self.block_events()),
            destination_errors: AtomicU64::new(self.destination_errors()),
            summaries_emitted: AtomicU64::new(self.summaries_emitted()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = DispatchMetrics::new();
        assert_eq!(metrics.enqueued(), 0);
        assert_eq!(metrics.dispatched(), 0);
        assert_eq!(metrics.discarded(), 0);
        assert_eq!(metrics.rejected(), 0);
        assert_eq!(metrics.block_events(), 0);
        assert_eq!(metrics.destination_errors(), 0);
        assert_eq!(metrics.summaries_emitted(), 0);
    }

    #[test]
    fn test_metrics_record_returns_previous() {
        let metrics = DispatchMetrics::new();
        assert_eq!(metrics.record_discarded(), 0);
        assert_eq!(metrics.record_discarded(), 1);
        assert_eq!(metrics.discarded(), 2);
    }

    #[test]
    fn test_metrics_discard_rate() {
        let metrics = DispatchMetrics::new();
        assert_eq!(metrics.discard_rate(), 0.0);

        for _ in 0..100 {
            metrics.record_enqueued();
        }
        assert_eq!(metrics.discard_rate(), 0.0);

        for _ in 0..10 {
            metrics.record_discarded();
        }
        let rate = metrics.discard_rate();
        assert!(rate > 9.0 && rate < 10.0, "Discard rate was {}", rate);
    }

    #[test]
    fn test_metrics_reset_and_snapshot() {
        let metrics = DispatchMetrics::new();
        metrics.record_enqueued();
        metrics.record_destination_error();

        let snapshot = metrics.clone();
        metrics.reset();

        assert_eq!(metrics.enqueued(), 0);
        assert_eq!(metrics.destination_errors(), 0);
        assert_eq!(snapshot.enqueued(), 1);
        assert_eq!(snapshot.destination_errors(), 1);
    }
}
