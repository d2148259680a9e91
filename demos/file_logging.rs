//! File logging example
//!
//! Demonstrates an async front writing to a file and the console, with a
//! fallback error sink that catches records a destination failed to write.
//!
//! Run with: cargo run --example file_logging

use rust_async_appender::prelude::*;
use std::sync::Arc;

fn main() -> Result<()> {
    println!("=== Rust Async Appender - File Logging Example ===\n");

    let fallback = Arc::new(FallbackErrorSink::with_inner(
        Box::new(ConsoleAppender::with_colors(false)),
        Arc::new(StderrErrorSink::only_once()),
    ));

    let front = AsyncAppender::builder()
        .name("app")
        .buffer_size(256)
        .location_info(true)
        .appender(FileAppender::exclusive("application.log")?)
        .appender(ConsoleAppender::new())
        .error_sink(fallback.clone())
        .start()?;

    println!("1. Logging to both console and file:");

    front.info("Application started");
    front.debug("Loading configuration...");
    front.info("Configuration loaded successfully");
    front.warn("Using default settings for some options");
    front.info("Connecting to database...");
    front.info("Database connection established");
    front.error("Failed to load optional plugin");
    front.info("Application initialization complete");

    println!("\n2. Destinations: {:?}", front.appender_names());

    front.close();
    fallback.close()?;

    println!("\n=== Example completed successfully! ===");
    println!("Check 'application.log' for file output");

    Ok(())
}
