//! Async logging example
//!
//! Demonstrates many producer threads sharing one front, and the two
//! overflow policies.
//!
//! Run with: cargo run --example async_logging

use rust_async_appender::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn main() -> Result<()> {
    println!("=== Rust Async Appender - Async Logging Example ===\n");

    println!("1. Multi-threaded logging with the blocking policy:");

    let front = Arc::new(
        AsyncAppender::builder()
            .name("workers")
            .buffer_size(64)
            .overflow_policy(OverflowPolicy::Block)
            .appender(ConsoleAppender::new())
            .start()?,
    );

    let mut handles = vec![];
    for thread_id in 0..5 {
        let front = Arc::clone(&front);
        let handle = thread::Builder::new()
            .name(format!("worker-{}", thread_id))
            .spawn(move || {
                for i in 0..20 {
                    front.info(format!("Thread {} - Message {}", thread_id, i));
                }
            })?;
        handles.push(handle);
    }

    for handle in handles {
        handle
            .join()
            .map_err(|_| LoggerError::other("worker thread panicked"))?;
    }
    front.close();

    let metrics = front.metrics();
    println!(
        "   enqueued={} dispatched={} blocked={}",
        metrics.enqueued(),
        metrics.dispatched(),
        metrics.block_events()
    );

    println!("\n2. Bursting into a small discarding queue:");

    let overflowed = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&overflowed);
    let front = AsyncAppender::builder()
        .name("burst")
        .buffer_size(8)
        .overflow_policy(OverflowPolicy::Discard)
        .on_overflow(Arc::new(move |_dropped| {
            counter.fetch_add(1, Ordering::Relaxed);
        }))
        .appender(ConsoleAppender::new())
        .start()?;

    for i in 0..200 {
        front.debug(format!("Burst message {}", i));
    }
    thread::sleep(Duration::from_millis(50));
    front.close();

    let metrics = front.metrics();
    println!(
        "   delivered={} discarded={} summaries={} overflow callbacks={}",
        metrics.dispatched() - metrics.summaries_emitted(),
        metrics.discarded(),
        metrics.summaries_emitted(),
        overflowed.load(Ordering::Relaxed)
    );

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
