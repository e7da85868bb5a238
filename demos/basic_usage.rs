//! Basic logger usage example
//!
//! Demonstrates the default logger, levels, contextual fields and the
//! error shapes.
//!
//! Run with: cargo run --example basic_usage

use fslog::prelude::*;
use fslog::{error, info, warn};

fn main() -> Result<()> {
    println!("=== fslog - Basic Usage Example ===\n");

    // The default logger writes console lines to stdout at level Debug
    println!("1. Logging at different levels:");
    fslog::debug("This is a debug message");
    fslog::info("This is an info message");
    fslog::warn("This is a warning message");
    fslog::error("This is an error message");

    println!("\n2. Raising the threshold:");
    fslog::set_level(Level::Warn);
    println!("   Level set to WARN - debug and info won't show:");
    fslog::debug("Debug message (hidden)");
    fslog::info("Info message (hidden)");
    warn!("Warning message {} (visible)", 1);
    fslog::set_level(Level::Debug);

    println!("\n3. Contextual fields:");
    let request = fslog::with("request_id", "7f3a").with("user", "alice");
    info!(request, "fetched {} items", 12);
    request.with("cache", "miss").debug("slow path");

    println!("\n4. Errors:");
    let cause = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
    let err = LoggerError::io_operation("connecting to db", "pool exhausted", cause);
    error!(err = err);
    error!(request, err = err, "retry {} failed", 3);

    println!("\n5. A private logger with its own output:");
    let buffer = SharedBuffer::new();
    let logger = Logger::builder().level(Level::Info).output(buffer.clone()).build();
    logger.info("captured");
    print!("   captured JSON: {}", buffer.contents());

    fslog::flush();
    println!("\n=== Example completed successfully! ===");
    Ok(())
}
