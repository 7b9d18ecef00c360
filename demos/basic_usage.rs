//! Basic logger usage example
//!
//! Configures a named logger once, then logs at every level with and without
//! structured extras. Set `LOGSTASH_HOST` to also ship documents to Logstash.
//!
//! Run with: cargo run --example basic_usage

use elk_logger::prelude::*;
use elk_logger::{info, warning};
use serde_json::json;

fn main() -> Result<()> {
    println!("=== ELK Logger - Basic Usage Example ===\n");

    let mut config = LoggerConfig::new()
        .with_level(LogLevel::Debug)
        .with_environment(Environment::Dev)
        .with_project_name("demo");
    if let Ok(host) = std::env::var("LOGSTASH_HOST") {
        config = config.with_logstash_host(host);
    }

    let logger = setup_logger("demo", config);
    println!("Appenders: {:?}\n", logger.appender_names());

    println!("1. Logging at different levels:");
    logger.debug("This is a debug message");
    logger.info("This is an info message");
    logger.warning("This is a warning message");
    logger.error("This is an error message");
    logger.critical("This is a critical message");

    println!("\n2. Same name, different config (ignored):");
    let again = setup_logger("demo", LoggerConfig::new().with_level(LogLevel::Critical));
    again.info("Still logging at the first configuration's level");

    println!("\n3. Structured extras:");
    let payload = json!({
        "order_id": 1042,
        "customer": "c".repeat(150),
        "items": ["book", "lamp"]
    });
    logger.info_with_context("Order received", build_extra_default(&payload));

    println!("\n4. Macros:");
    let retries = 3;
    info!(logger, "Connected after {} retries", retries);
    warning!(logger, "Queue at {}% capacity", 85);

    // Registry loggers are never dropped; drain queued Logstash documents
    flush_all()?;
    println!("\n=== Example completed successfully! ===");

    Ok(())
}
