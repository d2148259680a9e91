//! Background dispatcher
//!
//! A single worker thread drains the [`BoundedQueue`] in order and hands
//! every record to each destination appender in registration order.
//!
//! **Per-Appender Isolation**: each destination call is wrapped in
//! `catch_unwind`. An `Err` or a panic from one appender is reported to the
//! [`ErrorSink`] and the record still reaches the remaining appenders; the
//! worker itself keeps running.

use super::{
    appender::Appender,
    bounded_queue::BoundedQueue,
    error::{LoggerError, Result},
    error_sink::ErrorSink,
    log_entry::LogEntry,
    metrics::DispatchMetrics,
};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError};
use parking_lot::RwLock;
use std::any::Any;
use std::panic::{catch_unwind, resume_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};
use std::time::Duration;

/// Destinations shared between the front and its dispatcher
pub type SharedAppenders = Arc<RwLock<Vec<Box<dyn Appender>>>>;

/// Dispatcher lifecycle: `NotStarted -> Running -> Draining -> Stopped`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum DispatcherState {
    NotStarted = 0,
    Running = 1,
    Draining = 2,
    Stopped = 3,
}

impl DispatcherState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => DispatcherState::NotStarted,
            1 => DispatcherState::Running,
            2 => DispatcherState::Draining,
            _ => DispatcherState::Stopped,
        }
    }
}

/// Atomic cell holding a [`DispatcherState`]; states only move forward
#[derive(Debug)]
pub struct StateCell(AtomicU8);

impl StateCell {
    pub const fn new() -> Self {
        Self(AtomicU8::new(DispatcherState::NotStarted as u8))
    }

    pub fn load(&self) -> DispatcherState {
        DispatcherState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Move to `next` unless already at or past it
    pub fn advance(&self, next: DispatcherState) {
        self.0.fetch_max(next as u8, Ordering::AcqRel);
    }
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Dispatcher {
    queue: Arc<BoundedQueue>,
    appenders: SharedAppenders,
    error_sink: Arc<dyn ErrorSink>,
    metrics: Arc<DispatchMetrics>,
    state: Arc<StateCell>,
}

impl Dispatcher {
    pub fn new(
        queue: Arc<BoundedQueue>,
        appenders: SharedAppenders,
        error_sink: Arc<dyn ErrorSink>,
        metrics: Arc<DispatchMetrics>,
        state: Arc<StateCell>,
    ) -> Self {
        Self {
            queue,
            appenders,
            error_sink,
            metrics,
            state,
        }
    }

    /// Start the worker thread, named `thread_name`
    pub fn spawn(self, thread_name: impl Into<String>) -> Result<DispatcherHandle> {
        let (done_tx, done_rx) = bounded::<()>(1);
        let state = Arc::clone(&self.state);
        state.advance(DispatcherState::Running);

        let spawned = thread::Builder::new()
            .name(thread_name.into())
            .spawn(move || {
                if let Err(panic) = catch_unwind(AssertUnwindSafe(|| self.run())) {
                    // release blocked producers before the thread goes away;
                    // the dropped `done_tx` tells the joiner something broke
                    self.queue.drain_and_close();
                    self.state.advance(DispatcherState::Stopped);
                    resume_unwind(panic);
                }
                let _ = done_tx.send(());
            });

        match spawned {
            Ok(thread) => Ok(DispatcherHandle {
                thread_id: thread.thread().id(),
                thread,
                done: done_rx,
            }),
            Err(e) => {
                state.advance(DispatcherState::Stopped);
                Err(LoggerError::io_operation(
                    "spawning dispatcher",
                    "cannot start dispatcher thread",
                    e,
                ))
            }
        }
    }

    /// Drain the queue until it reports closed-and-empty, then close every
    /// destination and mark the state `Stopped`.
    ///
    /// Runs on the worker thread, or on the closing thread when the front
    /// was never activated.
    pub fn run(&self) {
        while let Some(entry) = self.queue.dequeue_blocking() {
            self.forward(&entry);
            if self.queue.is_empty() {
                self.flush_all();
            }
        }
        self.close_all();
        self.state.advance(DispatcherState::Stopped);
    }

    /// Hand one record to every destination, isolating failures
    pub fn forward(&self, entry: &LogEntry) {
        let mut appenders = self.appenders.write();
        for appender in appenders.iter_mut() {
            let result = catch_unwind(AssertUnwindSafe(|| appender.append(entry)));
            self.check(appender.name(), "append failed", result, Some(entry));
        }
        self.metrics.record_dispatched();
    }

    fn flush_all(&self) {
        let mut appenders = self.appenders.write();
        for appender in appenders.iter_mut() {
            let result = catch_unwind(AssertUnwindSafe(|| appender.flush()));
            self.check(appender.name(), "flush failed", result, None);
        }
    }

    fn close_all(&self) {
        let mut appenders = self.appenders.write();
        for appender in appenders.iter_mut() {
            let result = catch_unwind(AssertUnwindSafe(|| appender.close()));
            self.check(appender.name(), "close failed", result, None);
        }
    }

    fn check(
        &self,
        name: &str,
        context: &str,
        result: std::thread::Result<Result<()>>,
        entry: Option<&LogEntry>,
    ) {
        let error = match result {
            Ok(Ok(())) => return,
            Ok(Err(e)) => LoggerError::destination(name, e),
            Err(panic) => LoggerError::panicked(name, panic_message(panic.as_ref())),
        };
        self.metrics.record_destination_error();
        let reported = catch_unwind(AssertUnwindSafe(|| {
            self.error_sink.report(context, &error, entry)
        }));
        if let Err(panic) = reported {
            eprintln!(
                "[LOGGER ERROR] error sink panicked while reporting '{}': {}",
                error,
                panic_message(panic.as_ref())
            );
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Owned handle to a running dispatcher thread
pub struct DispatcherHandle {
    thread: JoinHandle<()>,
    thread_id: ThreadId,
    done: Receiver<()>,
}

impl DispatcherHandle {
    /// Wrap a thread that signals `done` when it finishes normally
    #[cfg(test)]
    pub(crate) fn from_parts(thread: JoinHandle<()>, done: Receiver<()>) -> Self {
        Self {
            thread_id: thread.thread().id(),
            thread,
            done,
        }
    }

    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }

    /// Wait for the worker to stop, however long that takes
    pub fn join(self) -> Result<()> {
        self.thread
            .join()
            .map_err(|panic| LoggerError::DispatcherError(panic_message(panic.as_ref())))
    }

    /// Wait up to `timeout` for the worker to stop.
    ///
    /// Returns `Ok(false)` if it is still running; the thread is then
    /// detached and keeps whatever it was doing.
    pub fn join_timeout(self, timeout: Duration) -> Result<bool> {
        match self.done.recv_timeout(timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => self.join().map(|()| true),
            Err(RecvTimeoutError::Timeout) => Ok(false),
        }
    }
}
