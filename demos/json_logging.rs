//! JSON output example.
//!
//! Every record is one JSON object: `l`, `t`, `logger`, `caller`, `msg`, then
//! extra fields in key order.
//!
//! Run with:
//! ```bash
//! cargo run --example json_logging
//! ```

use tierlog::{CallerFormat, Encoding, Logger, fields};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut logger = Logger::new();
    logger
        .set_name("json-demo")
        .set_encoding(Encoding::Json)
        .set_caller_format(CallerFormat::Short);
    logger.try_init_logger()?;

    logger.info(&[&"service started"]);
    logger.info_with_fields(
        fields! { "user" => "alice", "action" => "login" },
        "user performed an action",
        &[],
    );
    logger.warnf("retrying in %.1fs (attempt %d)", &[&1.5, &2]);

    // Native tracing events reach the same sinks inside the logger's scope.
    logger.in_scope(|| {
        tracing::error!(error_code = 404, path = "/api/users", "Resource not found");
    });

    logger.flush()?;
    Ok(())
}
