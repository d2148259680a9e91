//! The async front: the object application threads log into
//!
//! `AsyncAppender` snapshots each record on the calling thread, pushes it
//! into a [`BoundedQueue`] and lets a single background [`Dispatcher`]
//! forward it to the destination appenders.

use super::{
    appender::Appender,
    bounded_queue::{BoundedQueue, EnqueueOutcome},
    config::AsyncAppenderConfig,
    discard_summary::DiscardSummary,
    dispatcher::{Dispatcher, DispatcherHandle, DispatcherState, SharedAppenders, StateCell},
    error::{LoggerError, Result},
    error_sink::{ErrorSink, StderrErrorSink},
    log_entry::{LogEntry, Record},
    log_level::LogLevel,
    metrics::DispatchMetrics,
    overflow_policy::{OverflowCallback, OverflowPolicy},
};
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread::{self, ThreadId};
use std::time::Duration;

/// Default queue capacity
pub const DEFAULT_BUFFER_SIZE: usize = 128;

/// Shutdown timeout used when the front is dropped without an explicit
/// `close()` and no timeout was configured (5 seconds)
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

pub struct AsyncAppender {
    name: String,
    queue: Arc<BoundedQueue>,
    appenders: SharedAppenders,
    error_sink: Arc<dyn ErrorSink>,
    metrics: Arc<DispatchMetrics>,
    state: Arc<StateCell>,
    overflow_policy: OverflowPolicy,
    location_info: bool,
    on_overflow: Option<OverflowCallback>,
    shutdown_timeout: Option<Duration>,
    closed: AtomicBool,
    rejection_reported: AtomicBool,
    handle: Mutex<Option<DispatcherHandle>>,
    dispatcher_thread: OnceLock<ThreadId>,
}

impl AsyncAppender {
    pub fn builder() -> AsyncAppenderBuilder {
        AsyncAppenderBuilder::new()
    }

    /// Build an activated front from a parsed configuration
    pub fn from_config(config: &AsyncAppenderConfig) -> Result<Self> {
        AsyncAppenderBuilder::from_config(config)?.start()
    }

    /// Spawn the dispatcher.
    ///
    /// Records submitted before activation are buffered (and discarded on
    /// overflow, whatever the policy, since nothing would ever free a slot).
    /// Calling this again once running is a no-op.
    pub fn activate(&self) -> Result<()> {
        let mut handle = self.handle.lock();
        if self.is_closed() {
            return Err(LoggerError::stopped(&self.name));
        }
        if self.state.load() != DispatcherState::NotStarted {
            return Ok(());
        }

        let dispatcher = self.dispatcher();
        let spawned = dispatcher.spawn(format!("{}-dispatcher", self.name))?;
        let _ = self.dispatcher_thread.set(spawned.thread_id());
        *handle = Some(spawned);
        Ok(())
    }

    fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(
            Arc::clone(&self.queue),
            Arc::clone(&self.appenders),
            Arc::clone(&self.error_sink),
            Arc::clone(&self.metrics),
            Arc::clone(&self.state),
        )
    }

    /// Snapshot `record` on this thread and queue it for dispatch.
    ///
    /// Never fails from the caller's point of view: records arriving after
    /// `close()` are dropped and counted, records overflowing a discarding
    /// queue are counted and later summarized. With the blocking policy the
    /// call waits for a free slot.
    #[track_caller]
    pub fn submit(&self, record: Record<'_>) {
        if self.is_closed() {
            self.reject();
            return;
        }
        let entry = LogEntry::capture(&record, self.location_info, std::panic::Location::caller());
        self.enqueue(entry);
    }

    /// Queue an already-captured snapshot
    pub fn submit_entry(&self, entry: LogEntry) {
        if self.is_closed() {
            self.reject();
            return;
        }
        self.enqueue(entry);
    }

    fn enqueue(&self, entry: LogEntry) {
        let outcome = if self.should_block() {
            self.queue.blocking_enqueue(entry)
        } else {
            self.queue.try_enqueue(entry)
        };

        match outcome {
            EnqueueOutcome::Enqueued | EnqueueOutcome::EnqueuedAfterWait => {}
            EnqueueOutcome::Discarded { pending } => {
                if let Some(ref callback) = self.on_overflow {
                    callback(pending);
                }
            }
            EnqueueOutcome::Closed => self.reject(),
        }
    }

    /// Blocking only makes sense while a dispatcher is there to free slots,
    /// and never on the dispatcher's own thread.
    fn should_block(&self) -> bool {
        self.overflow_policy.is_blocking()
            && self.state.load() == DispatcherState::Running
            && self.dispatcher_thread.get() != Some(&thread::current().id())
    }

    fn reject(&self) {
        self.metrics.record_rejected();
        if !self.rejection_reported.swap(true, Ordering::Relaxed) {
            self.error_sink
                .report("record rejected", &LoggerError::stopped(&self.name), None);
        }
    }

    #[track_caller]
    pub fn log(&self, level: LogLevel, message: impl fmt::Display) {
        self.submit(Record::new(level, &message).logger(&self.name));
    }

    #[inline]
    #[track_caller]
    pub fn trace(&self, message: impl fmt::Display) {
        self.log(LogLevel::Trace, message);
    }

    #[inline]
    #[track_caller]
    pub fn debug(&self, message: impl fmt::Display) {
        self.log(LogLevel::Debug, message);
    }

    #[inline]
    #[track_caller]
    pub fn info(&self, message: impl fmt::Display) {
        self.log(LogLevel::Info, message);
    }

    #[inline]
    #[track_caller]
    pub fn warn(&self, message: impl fmt::Display) {
        self.log(LogLevel::Warn, message);
    }

    #[inline]
    #[track_caller]
    pub fn error(&self, message: impl fmt::Display) {
        self.log(LogLevel::Error, message);
    }

    #[inline]
    #[track_caller]
    pub fn fatal(&self, message: impl fmt::Display) {
        self.log(LogLevel::Fatal, message);
    }

    /// Register a destination; it receives records dispatched from now on.
    ///
    /// If the front is already closed the appender is closed right away.
    pub fn add_appender(&self, appender: Box<dyn Appender>) {
        if self.is_closed() {
            let mut appender = appender;
            if let Err(e) = appender.close() {
                let err = LoggerError::destination(appender.name().to_string(), e);
                self.error_sink.report("close failed", &err, None);
            }
            return;
        }
        self.appenders.write().push(appender);
    }

    /// Detach the first destination named `name` without closing it
    pub fn remove_appender(&self, name: &str) -> Option<Box<dyn Appender>> {
        let mut appenders = self.appenders.write();
        let idx = appenders.iter().position(|a| a.name() == name)?;
        Some(appenders.remove(idx))
    }

    /// Detach every destination without closing them
    pub fn remove_all_appenders(&self) -> Vec<Box<dyn Appender>> {
        std::mem::take(&mut *self.appenders.write())
    }

    pub fn has_appender(&self, name: &str) -> bool {
        self.appenders.read().iter().any(|a| a.name() == name)
    }

    pub fn appender_names(&self) -> Vec<String> {
        self.appenders
            .read()
            .iter()
            .map(|a| a.name().to_string())
            .collect()
    }

    /// Change the overflow policy; only allowed before activation
    pub fn set_overflow_policy(&mut self, policy: OverflowPolicy) -> Result<()> {
        self.ensure_not_started("overflow_policy")?;
        self.overflow_policy = policy;
        Ok(())
    }

    /// Toggle call-site capture; only allowed before activation
    pub fn set_location_info(&mut self, enabled: bool) -> Result<()> {
        self.ensure_not_started("location_info")?;
        self.location_info = enabled;
        Ok(())
    }

    fn ensure_not_started(&self, setting: &str) -> Result<()> {
        if self.state.load() == DispatcherState::NotStarted && !self.is_closed() {
            Ok(())
        } else {
            Err(LoggerError::config(
                "AsyncAppender",
                format!("{} cannot change after activation", setting),
            ))
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn buffer_size(&self) -> usize {
        self.queue.capacity()
    }

    pub fn overflow_policy(&self) -> OverflowPolicy {
        self.overflow_policy
    }

    pub fn is_blocking(&self) -> bool {
        self.overflow_policy.is_blocking()
    }

    pub fn location_info(&self) -> bool {
        self.location_info
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn dispatcher_state(&self) -> DispatcherState {
        self.state.load()
    }

    /// Records currently waiting in the queue
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Discards not yet reported by a summary record
    pub fn pending_discard_summary(&self) -> DiscardSummary {
        self.queue.pending_discards()
    }

    pub fn metrics(&self) -> &DispatchMetrics {
        &self.metrics
    }

    /// Stop accepting records, deliver everything already queued, close the
    /// destinations and stop the dispatcher.
    ///
    /// Waits for as long as the dispatcher needs, or for the configured
    /// `shutdown_timeout`. A destination that never returns from `append`
    /// or `close` blocks this call indefinitely when no timeout is set.
    /// Safe to call more than once, from any thread. Called from the
    /// dispatcher thread (a destination closing its own front) it only stops
    /// intake and returns; the drain finishes once that destination returns.
    pub fn close(&self) {
        let _ = self.shutdown(self.shutdown_timeout);
    }

    /// Like [`close`](Self::close) with an explicit bound.
    ///
    /// Returns `false` if the dispatcher was still running when `timeout`
    /// expired, or if it had died from a panic. A timed-out dispatcher is
    /// abandoned and records it had not delivered may be lost.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use rust_async_appender::prelude::*;
    /// use std::time::Duration;
    ///
    /// let front = AsyncAppender::builder().start().unwrap();
    /// front.info("Important message");
    ///
    /// if !front.close_with_timeout(Duration::from_secs(10)) {
    ///     eprintln!("Warning: dispatcher shutdown timed out");
    /// }
    /// ```
    pub fn close_with_timeout(&self, timeout: Duration) -> bool {
        self.shutdown(Some(timeout)).is_ok()
    }

    /// Shared by `close`, `close_with_timeout`, `Appender::close` and `Drop`.
    ///
    /// Failures are reported to the error sink and returned.
    fn shutdown(&self, timeout: Option<Duration>) -> Result<()> {
        if self.dispatcher_thread.get() == Some(&thread::current().id()) {
            // never wait on `handle` here: another closer may hold it while
            // joining this very thread
            if !self.closed.swap(true, Ordering::AcqRel) {
                self.begin_drain();
            }
            return Ok(());
        }

        let mut handle = self.handle.lock();
        let first = !self.closed.swap(true, Ordering::AcqRel);
        if first {
            self.begin_drain();
        }
        // dispatcher closing before `activate` recorded its thread id
        if handle.as_ref().map(DispatcherHandle::thread_id) == Some(thread::current().id()) {
            return Ok(());
        }

        // a close started on the dispatcher thread leaves the handle for
        // the first outside closer to join
        let Some(running) = handle.take() else {
            if first {
                // never activated: drain on this thread
                self.state.advance(DispatcherState::Draining);
                self.dispatcher().run();
            }
            return Ok(());
        };

        let joined = match timeout {
            None => running.join().map(|()| true),
            Some(timeout) => running.join_timeout(timeout),
        };

        let err = match joined {
            Ok(true) => return Ok(()),
            Ok(false) => LoggerError::shutdown_timeout(&self.name, timeout.unwrap_or_default()),
            Err(e) => e,
        };
        self.error_sink.report("shutdown", &err, None);
        Err(err)
    }

    fn begin_drain(&self) {
        // queue first: a producer that sees Draining must also see the
        // queue closed, or it could count a discard after close
        self.queue.drain_and_close();
        if self.state.load() == DispatcherState::Running {
            self.state.advance(DispatcherState::Draining);
        }
    }
}

impl fmt::Debug for AsyncAppender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncAppender")
            .field("name", &self.name)
            .field("buffer_size", &self.queue.capacity())
            .field("overflow_policy", &self.overflow_policy)
            .field("location_info", &self.location_info)
            .field("state", &self.state.load())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// An async front can itself be a destination of another front
impl Appender for AsyncAppender {
    fn append(&mut self, entry: &LogEntry) -> Result<()> {
        if self.is_closed() {
            return Err(LoggerError::stopped(&self.name));
        }
        self.submit_entry(entry.clone());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.shutdown(self.shutdown_timeout)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for AsyncAppender {
    fn drop(&mut self) {
        let timeout = self.shutdown_timeout.unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT);
        let _ = self.shutdown(Some(timeout));

        let discarded = self.metrics.discarded();
        if discarded > 0 {
            eprintln!(
                "[LOGGER WARNING] Async appender '{}' shut down with {} discarded records (discard rate: {:.2}%)",
                self.name,
                discarded,
                self.metrics.discard_rate()
            );
        }
    }
}

/// Builder for constructing an [`AsyncAppender`] with a fluent API
///
/// # Example
/// ```
/// use rust_async_appender::prelude::*;
/// use std::sync::Arc;
///
/// let front = AsyncAppender::builder()
///     .name("app")
///     .buffer_size(256)
///     .overflow_policy(OverflowPolicy::Discard)
///     .location_info(true)
///     .appender(MemoryAppender::new("memory"))
///     .on_overflow(Arc::new(|pending| {
///         eprintln!("ALERT: {} records discarded", pending);
///     }))
///     .start()
///     .unwrap();
///
/// front.info("ready");
/// front.close();
/// ```
pub struct AsyncAppenderBuilder {
    name: String,
    buffer_size: usize,
    overflow_policy: OverflowPolicy,
    location_info: bool,
    appenders: Vec<Box<dyn Appender>>,
    error_sink: Option<Arc<dyn ErrorSink>>,
    on_overflow: Option<OverflowCallback>,
    shutdown_timeout: Option<Duration>,
}

impl AsyncAppenderBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            name: "async".to_string(),
            buffer_size: DEFAULT_BUFFER_SIZE,
            overflow_policy: OverflowPolicy::default(),
            location_info: false,
            appenders: Vec::new(),
            error_sink: None,
            on_overflow: None,
            shutdown_timeout: None,
        }
    }

    /// Builder preloaded from a configuration; destinations are added
    /// separately
    pub fn from_config(config: &AsyncAppenderConfig) -> Result<Self> {
        config.validate()?;
        let mut builder = Self::new()
            .name(config.name.clone())
            .buffer_size(config.buffer_size)
            .blocking(config.blocking)
            .location_info(config.location_info);
        builder.shutdown_timeout = config.shutdown_timeout();
        Ok(builder)
    }

    #[must_use = "builder methods return a new value"]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Queue capacity; must be at least 1
    #[must_use = "builder methods return a new value"]
    pub fn buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.overflow_policy = policy;
        self
    }

    /// Shorthand for `overflow_policy(OverflowPolicy::from_blocking(..))`
    #[must_use = "builder methods return a new value"]
    pub fn blocking(self, blocking: bool) -> Self {
        self.overflow_policy(OverflowPolicy::from_blocking(blocking))
    }

    /// Capture the caller's location for every record
    #[must_use = "builder methods return a new value"]
    pub fn location_info(mut self, enabled: bool) -> Self {
        self.location_info = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn appender<A: Appender + 'static>(mut self, appender: A) -> Self {
        self.appenders.push(Box::new(appender));
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn boxed_appender(mut self, appender: Box<dyn Appender>) -> Self {
        self.appenders.push(appender);
        self
    }

    /// Where destination failures go; defaults to [`StderrErrorSink`]
    #[must_use = "builder methods return a new value"]
    pub fn error_sink(mut self, sink: Arc<dyn ErrorSink>) -> Self {
        self.error_sink = Some(sink);
        self
    }

    /// Callback invoked on every discarded record
    #[must_use = "builder methods return a new value"]
    pub fn on_overflow(mut self, callback: OverflowCallback) -> Self {
        self.on_overflow = Some(callback);
        self
    }

    /// Upper bound for `close()`; unbounded when unset
    #[must_use = "builder methods return a new value"]
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = Some(timeout);
        self
    }

    /// Build the front without starting the dispatcher
    pub fn build(self) -> Result<AsyncAppender> {
        let metrics = Arc::new(DispatchMetrics::new());
        let queue = BoundedQueue::new(self.buffer_size, self.name.clone(), Arc::clone(&metrics))
            .map_err(|_| LoggerError::config("AsyncAppender", "buffer_size must be at least 1"))?;

        Ok(AsyncAppender {
            name: self.name,
            queue: Arc::new(queue),
            appenders: Arc::new(RwLock::new(self.appenders)),
            error_sink: self
                .error_sink
                .unwrap_or_else(|| Arc::new(StderrErrorSink::new())),
            metrics,
            state: Arc::new(StateCell::new()),
            overflow_policy: self.overflow_policy,
            location_info: self.location_info,
            on_overflow: self.on_overflow,
            shutdown_timeout: self.shutdown_timeout,
            closed: AtomicBool::new(false),
            rejection_reported: AtomicBool::new(false),
            handle: Mutex::new(None),
            dispatcher_thread: OnceLock::new(),
        })
    }

    /// Build and activate
    pub fn start(self) -> Result<AsyncAppender> {
        let front = self.build()?;
        front.activate()?;
        Ok(front)
    }
}

impl Default for AsyncAppenderBuilder {
    fn default() -> Self {
        Self::new()
    }
}
