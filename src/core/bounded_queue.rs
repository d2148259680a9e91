//! Bounded FIFO between producer threads and the dispatcher
//!
//! One mutex guards the buffer, the discard count and the closed flag, so
//! "check capacity, insert or count the discard" is a single atomic step.
//! The dispatcher only holds the lock to pop; it never forwards to
//! destinations while holding it, so a producer blocked on a full queue
//! can always be released.

use super::discard_summary::DiscardSummary;
use super::error::{LoggerError, Result};
use super::log_entry::LogEntry;
use super::metrics::DispatchMetrics;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::Arc;

/// Result of an insertion attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// Inserted without waiting
    Enqueued,
    /// Inserted after waiting for the dispatcher to free a slot
    EnqueuedAfterWait,
    /// Queue was full; the record was dropped and counted
    Discarded { pending: u64 },
    /// Queue no longer accepts records
    Closed,
}

impl EnqueueOutcome {
    pub fn is_enqueued(&self) -> bool {
        matches!(self, EnqueueOutcome::Enqueued | EnqueueOutcome::EnqueuedAfterWait)
    }
}

struct QueueState {
    buffer: VecDeque<LogEntry>,
    discards: DiscardSummary,
    closed: bool,
}

pub struct BoundedQueue {
    state: Mutex<QueueState>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: usize,
    summary_logger: String,
    metrics: Arc<DispatchMetrics>,
}

impl BoundedQueue {
    /// Create a queue holding at most `capacity` records.
    ///
    /// `summary_logger` is the logger name stamped on discard-summary
    /// records.
    pub fn new(
        capacity: usize,
        summary_logger: impl Into<String>,
        metrics: Arc<DispatchMetrics>,
    ) -> Result<Self> {
        if capacity == 0 {
            return Err(LoggerError::config(
                "BoundedQueue",
                "capacity must be at least 1",
            ));
        }
        Ok(Self {
            state: Mutex::new(QueueState {
                buffer: VecDeque::with_capacity(capacity),
                discards: DiscardSummary::new(),
                closed: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity,
            summary_logger: summary_logger.into(),
            metrics,
        })
    }

    /// Insert if there is room, otherwise count the record as discarded
    pub fn try_enqueue(&self, entry: LogEntry) -> EnqueueOutcome {
        let mut state = self.state.lock();
        if state.closed {
            return EnqueueOutcome::Closed;
        }
        if state.buffer.len() < self.capacity {
            self.push(&mut state, entry);
            return EnqueueOutcome::Enqueued;
        }
        let pending = state.discards.add(entry.level);
        self.metrics.record_discarded();
        EnqueueOutcome::Discarded { pending }
    }

    /// Insert, waiting for a free slot if necessary.
    ///
    /// Returns `Closed` if the queue is closed before a slot frees up; the
    /// record is then dropped.
    pub fn blocking_enqueue(&self, entry: LogEntry) -> EnqueueOutcome {
        let mut state = self.state.lock();
        let mut waited = false;
        loop {
            if state.closed {
                return EnqueueOutcome::Closed;
            }
            if state.buffer.len() < self.capacity {
                self.push(&mut state, entry);
                return if waited {
                    EnqueueOutcome::EnqueuedAfterWait
                } else {
                    EnqueueOutcome::Enqueued
                };
            }
            if !waited {
                self.metrics.record_block();
                waited = true;
            }
            self.not_full.wait(&mut state);
        }
    }

    fn push(&self, state: &mut QueueState, entry: LogEntry) {
        state.buffer.push_back(entry);
        self.metrics.record_enqueued();
        self.not_empty.notify_one();
    }

    /// Take the oldest record, waiting while the queue is empty.
    ///
    /// Returns `None` once the queue is closed and fully drained. If
    /// records were discarded, the slot freed by this call is filled with
    /// the discard-summary record, behind everything already accepted.
    pub fn dequeue_blocking(&self) -> Option<LogEntry> {
        let mut state = self.state.lock();
        loop {
            if let Some(entry) = state.buffer.pop_front() {
                match state.discards.take(&self.summary_logger) {
                    Some(summary) => {
                        state.buffer.push_back(summary);
                        self.metrics.record_summary();
                    }
                    None => {
                        self.not_full.notify_one();
                    }
                }
                return Some(entry);
            }
            if let Some(summary) = state.discards.take(&self.summary_logger) {
                self.metrics.record_summary();
                return Some(summary);
            }
            if state.closed {
                return None;
            }
            self.not_empty.wait(&mut state);
        }
    }

    /// Stop accepting records and wake every waiter.
    ///
    /// Records already queued stay queued for the dispatcher.
    pub fn drain_and_close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.state.lock().buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().buffer.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Records discarded since the last summary was emitted
    pub fn discard_count(&self) -> u64 {
        self.state.lock().discards.count()
    }

    pub fn pending_discards(&self) -> DiscardSummary {
        self.state.lock().discards.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LogLevel;
    use std::thread;
    use std::time::Duration;

    fn queue(capacity: usize) -> BoundedQueue {
        BoundedQueue::new(capacity, "test", Arc::new(DispatchMetrics::new())).unwrap()
    }

    fn entry(msg: &str) -> LogEntry {
        LogEntry::new(LogLevel::Info, msg)
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let result = BoundedQueue::new(0, "test", Arc::new(DispatchMetrics::new()));
        assert!(matches!(
            result,
            Err(LoggerError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_fifo_order() {
        let q = queue(4);
        for msg in ["a", "b", "c"] {
            assert_eq!(q.try_enqueue(entry(msg)), EnqueueOutcome::Enqueued);
        }
        q.drain_and_close();

        let drained: Vec<String> = std::iter::from_fn(|| q.dequeue_blocking())
            .map(|e| e.message)
            .collect();
        assert_eq!(drained, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_overflow_counts_discards() {
        let q = queue(2);
        q.try_enqueue(entry("1"));
        q.try_enqueue(entry("2"));
        assert_eq!(
            q.try_enqueue(entry("3")),
            EnqueueOutcome::Discarded { pending: 1 }
        );
        assert_eq!(
            q.try_enqueue(entry("4")),
            EnqueueOutcome::Discarded { pending: 2 }
        );
        assert_eq!(q.len(), 2);
        assert_eq!(q.discard_count(), 2);
    }

    #[test]
    fn test_summary_fills_freed_slot_behind_accepted_records() {
        let q = queue(2);
        q.try_enqueue(entry("1"));
        q.try_enqueue(entry("2"));
        q.try_enqueue(entry("3"));
        q.try_enqueue(entry("4"));

        assert_eq!(q.dequeue_blocking().unwrap().message, "1");
        assert_eq!(q.discard_count(), 0);
        assert_eq!(q.len(), 2);

        // summary already owns the freed slot
        assert!(matches!(
            q.try_enqueue(entry("5")),
            EnqueueOutcome::Discarded { pending: 1 }
        ));

        assert_eq!(q.dequeue_blocking().unwrap().message, "2");
        let summary = q.dequeue_blocking().unwrap();
        assert_eq!(summary.level, LogLevel::Error);
        assert_eq!(summary.message, "2 records discarded");
        assert_eq!(summary.logger_name, "test");

        q.drain_and_close();
        assert_eq!(q.dequeue_blocking().unwrap().message, "1 records discarded");
        assert!(q.dequeue_blocking().is_none());
    }

    #[test]
    fn test_closed_rejects_but_keeps_queued() {
        let q = queue(2);
        q.try_enqueue(entry("kept"));
        q.drain_and_close();

        assert_eq!(q.try_enqueue(entry("late")), EnqueueOutcome::Closed);
        assert_eq!(q.blocking_enqueue(entry("late")), EnqueueOutcome::Closed);
        assert_eq!(q.dequeue_blocking().unwrap().message, "kept");
        assert!(q.dequeue_blocking().is_none());
    }

    #[test]
    fn test_blocking_enqueue_waits_for_space() {
        let q = Arc::new(queue(1));
        q.try_enqueue(entry("first"));

        let producer = {
            let q = Arc::clone(&q);
            thread::spawn(move || q.blocking_enqueue(entry("second")))
        };

        thread::sleep(Duration::from_millis(50));
        assert_eq!(q.len(), 1);
        assert_eq!(q.dequeue_blocking().unwrap().message, "first");

        assert_eq!(producer.join().unwrap(), EnqueueOutcome::EnqueuedAfterWait);
        assert_eq!(q.dequeue_blocking().unwrap().message, "second");
    }

    #[test]
    fn test_close_wakes_blocked_producer_and_consumer() {
        let full = Arc::new(queue(1));
        full.try_enqueue(entry("occupying"));
        let producer = {
            let q = Arc::clone(&full);
            thread::spawn(move || q.blocking_enqueue(entry("waiting")))
        };

        let empty = Arc::new(queue(1));
        let consumer = {
            let q = Arc::clone(&empty);
            thread::spawn(move || q.dequeue_blocking())
        };

        thread::sleep(Duration::from_millis(50));
        full.drain_and_close();
        empty.drain_and_close();

        assert_eq!(producer.join().unwrap(), EnqueueOutcome::Closed);
        assert!(consumer.join().unwrap().is_none());
    }
}
