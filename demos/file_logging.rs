//! File logging example
//!
//! Demonstrates logging to both console and a rotating JSON file.
//!
//! Run with: cargo run --example file_logging

use fslog::prelude::*;

fn main() -> Result<()> {
    println!("=== fslog - File Logging Example ===\n");

    // Console output comes with the default logger; add a rotating file
    fslog::new_file_output(
        FileOutputConfig::new("logs/application.log")
            .with_max_size(10)
            .with_max_age(7)
            .with_max_backups(5)
            .with_local_time(true)
            .with_compress(true),
    )?;

    println!("1. Logging to both console and file:");
    fslog::info("Application started");
    fslog::debug("Loading configuration...");
    fslog::with("path", "config.toml").info("Configuration loaded successfully");
    fslog::warn("Using default settings for some options");
    fslog::with("retries", 2).error("Failed to load optional plugin");

    println!("\n2. Performing some operations:");
    let worker = fslog::with("worker", 1);
    for i in 1..=5 {
        worker.info(format_args!("Processing item {}/5", i));
        if i == 3 {
            worker.warn("Item 3 took longer than expected");
        }
    }

    fslog::info("All operations completed");
    fslog::flush();

    println!("\n=== Example completed successfully! ===");
    println!("Check 'logs/application.log' for the JSON output");
    Ok(())
}
