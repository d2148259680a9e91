//! Basic async appender usage example
//!
//! Demonstrates a console destination behind an async front, the logging
//! macros and location capture.
//!
//! Run with: cargo run --example basic_usage

use rust_async_appender::prelude::*;
use rust_async_appender::{error, info, warn};

fn main() -> Result<()> {
    println!("=== Rust Async Appender - Basic Usage Example ===\n");

    // Front with a console destination; the dispatcher starts immediately
    let front = AsyncAppender::builder()
        .name("basic")
        .location_info(true)
        .appender(ConsoleAppender::new())
        .start()?;

    println!("1. Logging at different levels:");
    front.trace("This is a trace message");
    front.debug("This is a debug message");
    front.info("This is an info message");
    front.warn("This is a warning message");
    front.error("This is an error message");
    front.fatal("This is a fatal message");

    println!("\n2. Logging with macros:");
    let user = "alice";
    info!(front, "User {} logged in", user);
    warn!(front, "Disk usage at {}%", 91);
    error!(front, "Request failed with status {}", 503);

    println!("\n3. Logging with an attached error:");
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "config.toml");
    front.submit(
        Record::new(LogLevel::Error, &"could not load configuration")
            .logger("config")
            .error(&io_error),
    );

    // Everything submitted above is written before close returns
    front.close();

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
