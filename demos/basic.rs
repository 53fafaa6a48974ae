//! Basic console logging example.
//!
//! This example demonstrates the simplest way to build a logger with the
//! builder API and log through each call shape.

use tierlog::{Level, fields};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logger = tierlog::builder().with_level(Level::Debug).build()?;

    logger.debug(&[&"This is a debug message"]);
    logger.info(&[&"Listening on", &"0.0.0.0:8080"]);
    logger.warnf("Disk usage at %d%%", &[&91]);
    logger.error_with_fields(
        fields! { "path" => "/api/users", "status" => 404 },
        "Resource not found",
        &[],
    );

    logger.flush()?;
    Ok(())
}
