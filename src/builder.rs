//! Builder for constructing an initialized [`Logger`] in one chain.
//!
//! # Example
//!
//! ```rust,no_run
//! use tierlog::{Encoding, Level};
//!
//! // Console only
//! let logger = tierlog::builder()
//!     .with_level(Level::Debug)
//!     .build()
//!     .expect("Failed to initialize logging");
//! logger.debug(&[&"ready"]);
//!
//! // Per-level files plus console
//! let logger = tierlog::builder()
//!     .with_encoding(Encoding::Json)
//!     .with_output_file("/var/log/app", Some("app"))
//!     .with_console(true)
//!     .build()
//!     .expect("Failed to initialize logging");
//! ```

use std::path::PathBuf;
use std::time::Duration;

use tracing_subscriber::fmt::MakeWriter;

use crate::context::{Context, Fields};
use crate::pipeline::ConsoleWriter;
use crate::{CallerFormat, Encoding, Level, Logger, LoggerConfig, Result};

/// A builder for configuring a [`Logger`].
///
/// Nothing is set up until [`LoggerBuilder::build`], which runs the single
/// initialization step.
#[derive(Default)]
pub struct LoggerBuilder {
    config: LoggerConfig,
    console: Option<ConsoleWriter>,
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration, e.g. one loaded from a file.
    pub fn from_config(config: LoggerConfig) -> Self {
        Self {
            config,
            console: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.config = self.config.with_name(name);
        self
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.config = self.config.with_level(level);
        self
    }

    pub fn with_caller(mut self, caller: CallerFormat) -> Self {
        self.config = self.config.with_caller(caller);
        self
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.config = self.config.with_encoding(encoding);
        self
    }

    /// Write per-level files under `dir`.
    pub fn with_output_file(mut self, dir: impl Into<PathBuf>, file_name: Option<&str>) -> Self {
        self.config = self
            .config
            .with_output_file(dir, file_name.map(str::to_string));
        self
    }

    pub fn with_file_rotate(mut self, max_age: Duration, rotation: Duration) -> Self {
        self.config = self.config.with_file_rotate(max_age, rotation);
        self
    }

    pub fn with_console(mut self, console: bool) -> Self {
        self.config = self.config.with_console(console);
        self
    }

    pub fn with_caller_skip(mut self, skip: usize) -> Self {
        self.config = self.config.with_caller_skip(skip);
        self
    }

    pub fn with_field_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&Context, &mut Fields) + Send + Sync + 'static,
    {
        self.config = self.config.with_field_fn(f);
        self
    }

    /// Send console output somewhere other than stdout.
    pub fn with_console_writer<W>(mut self, make_writer: W) -> Self
    where
        W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
    {
        self.console = Some(ConsoleWriter::new(make_writer));
        self
    }

    /// The configuration built so far.
    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// Initialize and return the logger.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Init`](crate::Error::Init) if a file sink cannot be
    /// set up.
    pub fn build(self) -> Result<Logger> {
        let mut logger = Logger::new();
        logger.set_config(self.config);
        if let Some(console) = self.console {
            logger.set_console_sink(console);
        }
        logger.try_init_logger()?;
        Ok(logger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SinkTarget;

    #[test]
    fn test_builder_new() {
        let builder = LoggerBuilder::new();
        let config = builder.config();
        assert!(!config.console);
        assert_eq!(config.level, Level::Info);
        assert_eq!(config.encoding, Encoding::Text);
    }

    #[test]
    fn test_builder_chaining() {
        let builder = LoggerBuilder::new()
            .with_name("api")
            .with_level(Level::Debug)
            .with_caller(CallerFormat::Short)
            .with_encoding(Encoding::Json)
            .with_output_file("app_logs", Some("app"))
            .with_file_rotate(Duration::from_secs(60), Duration::from_secs(60))
            .with_console(true)
            .with_caller_skip(1);

        let config = builder.config();
        assert_eq!(config.name.as_deref(), Some("api"));
        assert_eq!(config.level, Level::Debug);
        assert_eq!(config.caller, CallerFormat::Short);
        assert_eq!(config.encoding, Encoding::Json);
        assert_eq!(config.file_name(), Some("app"));
        assert_eq!(config.file_rotation, Duration::from_secs(60));
        assert!(config.console);
        assert_eq!(config.caller_skip, 1);
    }

    #[test]
    fn test_builder_from_config() {
        let original = LoggerConfig::new().with_level(Level::Warn).with_console(true);
        let builder = LoggerBuilder::from_config(original.clone());
        assert_eq!(builder.config().level, original.level);
        assert_eq!(builder.config().console, original.console);
    }

    #[test]
    fn test_build_plans_file_sinks() {
        let dir = tempfile::tempdir().unwrap();
        let logger = LoggerBuilder::new()
            .with_level(Level::Warn)
            .with_output_file(dir.path(), Some("svc"))
            .with_console(true)
            .build()
            .unwrap();

        let targets: Vec<_> = logger.sinks().iter().map(|s| s.target.clone()).collect();
        assert_eq!(
            targets,
            vec![
                SinkTarget::File(dir.path().join("svc_warn.log")),
                SinkTarget::File(dir.path().join("svc_err.log")),
                SinkTarget::Console,
            ]
        );
    }
}
