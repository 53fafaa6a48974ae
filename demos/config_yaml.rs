//! Example of loading logger configuration from YAML.
//!
//! Run with:
//! ```bash
//! cargo run --example config_yaml
//! ```

use std::collections::HashMap;

use tierlog::{LoggerBuilder, LoggerConfig};

const CONFIG: &str = r#"
log:
  name: config-demo
  level: debug
  caller: short
  encoding: text
  output_dir: ./log
  file_name: config_demo
  file_max_age: 7d
  file_rotation: 24h
  console: true
"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let root: HashMap<String, serde_yaml::Value> = serde_yaml::from_str(CONFIG)?;
    let config: LoggerConfig = serde_yaml::from_value(root["log"].clone())?;

    let logger = LoggerBuilder::from_config(config).build()?;

    logger.debug(&[&"This is a debug message"]);
    logger.info(&[&"This is an info message"]);
    logger.warnf("Resource %s not found", &[&"/api/users"]);
    logger.error(&[&"This is an error message"]);

    logger.flush()?;
    Ok(())
}
