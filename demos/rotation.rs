//! Per-level rotating files.
//!
//! Writes under `./log`: `demo_debug.log`, `demo_info.log`, `demo_warn.log`
//! and `demo_err.log` link to timestamped files that rotate every minute and
//! are removed after an hour.
//!
//! Run with:
//! ```bash
//! cargo run --example rotation
//! ```

use std::thread;
use std::time::Duration;

use tierlog::{Level, Logger};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut logger = Logger::new();
    logger
        .set_level(Level::Debug)
        .set_output_file("./log", Some("demo"))
        .set_file_rotate(Duration::from_secs(3600), Duration::from_secs(60))
        .set_console(true);
    logger.try_init_logger()?;

    for sink in logger.sinks() {
        println!("sink: {:?}", sink);
    }

    for i in 0..5 {
        logger.debugf("tick %d", &[&i]);
        logger.infof("tick %d", &[&i]);
        if i % 2 == 0 {
            logger.warnf("even tick %d", &[&i]);
        }
        if i == 4 {
            logger.errorf("last tick %d", &[&i]);
        }
        thread::sleep(Duration::from_millis(500));
    }

    logger.flush()?;
    Ok(())
}
