//! The logger facade.
//!
//! A [`Logger`] holds a mutable [`LoggerConfig`] and the pipeline assembled
//! from it by the last call to [`Logger::init_logger`]. Setters only touch the
//! configuration; nothing changes on the output side until the next init.

use std::fmt::{self, Display};
use std::panic::Location;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::fmt::MakeWriter;

use crate::caller;
use crate::context::{Context, Fields};
use crate::pipeline::{ConsoleWriter, Pipeline, SinkSpec};
use crate::template::{sprint, sprintf};
use crate::{CallerFormat, Encoding, Error, Level, LoggerConfig, Result, Severity};

/// Generates the five call shapes for one severity.
macro_rules! entry_points {
    (
        $severity:expr, $finish:ident $(-> $ret:ty)?;
        $plain:ident, $template:ident, $with_fields:ident, $context:ident, $context_with_fields:ident
    ) => {
        #[doc = concat!("Log the arguments, joined with spaces, at `", stringify!($severity), "`.")]
        #[track_caller]
        pub fn $plain(&self, args: &[&dyn Display]) $(-> $ret)? {
            let message = sprint(args);
            self.emit($severity, None, &message);
            self.$finish(message)
        }

        #[doc = concat!("Log a printf-style template at `", stringify!($severity), "`.")]
        #[track_caller]
        pub fn $template(&self, template: &str, args: &[&dyn Display]) $(-> $ret)? {
            let message = sprintf(template, args);
            self.emit($severity, None, &message);
            self.$finish(message)
        }

        #[doc = concat!("Log a template with extra fields at `", stringify!($severity), "`.")]
        #[track_caller]
        pub fn $with_fields(&self, fields: Fields, template: &str, args: &[&dyn Display]) $(-> $ret)? {
            let message = sprintf(template, args);
            self.emit($severity, Some(&fields), &message);
            self.$finish(message)
        }

        #[doc = concat!("Log a template with fields derived from `ctx` at `", stringify!($severity), "`.")]
        #[track_caller]
        pub fn $context(&self, ctx: &Context, template: &str, args: &[&dyn Display]) $(-> $ret)? {
            let fields = self.enrich(ctx, Fields::new());
            let message = sprintf(template, args);
            self.emit($severity, Some(&fields), &message);
            self.$finish(message)
        }

        #[doc = concat!("Log a template with explicit and context-derived fields at `", stringify!($severity), "`.")]
        #[track_caller]
        pub fn $context_with_fields(
            &self,
            ctx: &Context,
            fields: Fields,
            template: &str,
            args: &[&dyn Display],
        ) $(-> $ret)? {
            let fields = self.enrich(ctx, fields);
            let message = sprintf(template, args);
            self.emit($severity, Some(&fields), &message);
            self.$finish(message)
        }
    };
}

/// A configurable logger instance.
///
/// ```rust
/// use tierlog::{Encoding, Level, Logger};
///
/// let mut logger = Logger::new();
/// logger.set_level(Level::Debug).set_encoding(Encoding::Json);
/// logger.init_logger();
///
/// logger.info(&[&"listening on", &8080]);
/// logger.debugf("took %dms", &[&12]);
/// ```
pub struct Logger {
    config: LoggerConfig,
    console: ConsoleWriter,
    pipeline: Pipeline,
}

impl Logger {
    /// Create a logger with the default configuration.
    ///
    /// It logs to stdout at `Info` in the text encoding until reconfigured.
    pub fn new() -> Self {
        let console = ConsoleWriter::stdout();
        Self {
            config: LoggerConfig::new(),
            pipeline: Pipeline::console_only(&console),
            console,
        }
    }

    /// Create a logger from `config` and initialize it.
    pub fn with_config(config: LoggerConfig) -> Result<Self> {
        let mut logger = Self::new();
        logger.config = config;
        logger.try_init_logger()?;
        Ok(logger)
    }

    /// Rebuild the output pipeline from the current configuration.
    ///
    /// # Panics
    ///
    /// Panics if a file sink cannot be set up (for example when the output
    /// directory cannot be created). Use [`Logger::try_init_logger`] to handle
    /// that case.
    pub fn init_logger(&mut self) {
        if let Err(e) = self.try_init_logger() {
            panic!("failed to initialize logger: {}", e);
        }
    }

    /// Rebuild the output pipeline, returning setup failures.
    ///
    /// The previous pipeline stays in place when this fails.
    pub fn try_init_logger(&mut self) -> Result<()> {
        self.pipeline = Pipeline::build(&self.config, &self.console)?;
        Ok(())
    }

    /// Block until every sink has written out buffered records.
    pub fn flush(&self) -> Result<()> {
        self.pipeline.flush()
    }

    /// The configuration the next init will use.
    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// Replace the whole configuration; takes effect on the next init.
    pub fn set_config(&mut self, config: LoggerConfig) -> &mut Self {
        self.config = config;
        self
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.config.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.config.name.as_deref()
    }

    pub fn set_level(&mut self, level: Level) -> &mut Self {
        self.config.level = level;
        self
    }

    pub fn level(&self) -> Level {
        self.config.level
    }

    pub fn set_caller_format(&mut self, caller: CallerFormat) -> &mut Self {
        self.config.caller = caller;
        self
    }

    pub fn caller_format(&self) -> CallerFormat {
        self.config.caller
    }

    pub fn set_encoding(&mut self, encoding: Encoding) -> &mut Self {
        self.config.encoding = encoding;
        self
    }

    pub fn encoding(&self) -> Encoding {
        self.config.encoding
    }

    /// Enable per-level file output under `dir`.
    ///
    /// Files are named `<file_name>_<level>.log`, or `access.log`, `info.log`,
    /// `warn.log` and `error.log` when `file_name` is `None`.
    pub fn set_output_file(
        &mut self,
        dir: impl Into<std::path::PathBuf>,
        file_name: Option<&str>,
    ) -> &mut Self {
        self.config.output_dir = Some(dir.into());
        self.config.file_name = file_name.map(str::to_string);
        self
    }

    pub fn output_file(&self) -> (Option<&Path>, Option<&str>) {
        (self.config.output_dir(), self.config.file_name())
    }

    /// Set retention and rotation interval; zero selects 30 days and 24 hours.
    pub fn set_file_rotate(&mut self, max_age: Duration, rotation: Duration) -> &mut Self {
        self.config.file_max_age = max_age;
        self.config.file_rotation = rotation;
        self
    }

    /// Retention and rotation interval as configured, before defaulting.
    pub fn file_rotate(&self) -> (Duration, Duration) {
        (self.config.file_max_age, self.config.file_rotation)
    }

    pub fn set_console(&mut self, console: bool) -> &mut Self {
        self.config.console = console;
        self
    }

    pub fn console(&self) -> bool {
        self.config.console
    }

    /// Number of wrapper frames to skip when reporting the caller.
    ///
    /// At zero the call site comes from `#[track_caller]`, so wrappers marked
    /// `#[track_caller]` need no adjustment. Above zero the stack is walked
    /// and `skip` plain frames above the logging call are skipped; this needs
    /// debug symbols and reports the path they record. Takes effect on the
    /// next init.
    pub fn set_caller_skip(&mut self, skip: usize) -> &mut Self {
        self.config.caller_skip = skip;
        self
    }

    pub fn caller_skip(&self) -> usize {
        self.config.caller_skip
    }

    /// Register the callback that derives fields from a [`Context`].
    ///
    /// Unlike the other settings this applies immediately.
    pub fn add_field_fn<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&Context, &mut Fields) + Send + Sync + 'static,
    {
        self.config.field_fn = Some(Arc::new(f));
        self
    }

    /// Send console output to `make_writer` instead of stdout; takes effect on the next init.
    pub fn set_console_writer<W>(&mut self, make_writer: W) -> &mut Self
    where
        W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
    {
        self.set_console_sink(ConsoleWriter::new(make_writer))
    }

    pub(crate) fn set_console_sink(&mut self, console: ConsoleWriter) -> &mut Self {
        self.console = console;
        self
    }

    /// The sinks of the active pipeline.
    pub fn sinks(&self) -> &[SinkSpec] {
        self.pipeline.specs()
    }

    /// Run `f` with this logger's pipeline as the current `tracing` dispatcher.
    ///
    /// Native `tracing` events emitted inside `f` reach the same sinks as the
    /// facade's own calls.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(self.pipeline.dispatch(), f)
    }

    /// Handle to the active pipeline, usable after this logger is borrowed away.
    pub(crate) fn dispatch(&self) -> tracing::Dispatch {
        self.pipeline.dispatch().clone()
    }

    /// Install this logger's pipeline as the process-wide `tracing` subscriber.
    pub fn install_global(&self) -> Result<()> {
        tracing::dispatcher::set_global_default(self.pipeline.dispatch().clone())
            .map_err(|e| Error::Init(e.to_string()))
    }

    entry_points!(Severity::Debug, proceed; debug, debugf, debug_with_fields, debug_context, debug_context_with_fields);
    entry_points!(Severity::Info, proceed; info, infof, info_with_fields, info_context, info_context_with_fields);
    entry_points!(Severity::Warn, proceed; warn, warnf, warn_with_fields, warn_context, warn_context_with_fields);
    entry_points!(Severity::Error, proceed; error, errorf, error_with_fields, error_context, error_context_with_fields);
    entry_points!(Severity::Fatal, exit -> !; fatal, fatalf, fatal_with_fields, fatal_context, fatal_context_with_fields);
    entry_points!(Severity::Panic, unwind -> !; panic, panicf, panic_with_fields, panic_context, panic_context_with_fields);

    /// Merge the enricher's output into `fields`.
    fn enrich(&self, ctx: &Context, mut fields: Fields) -> Fields {
        if let Some(field_fn) = &self.config.field_fn {
            field_fn(ctx, &mut fields);
        }
        fields
    }

    #[track_caller]
    fn emit(&self, severity: Severity, fields: Option<&Fields>, message: &str) {
        if !self.pipeline.enabled(severity) {
            return;
        }
        let location = Location::caller();
        let resolved = match self.pipeline.caller_skip() {
            0 => None,
            skip => caller::resolve(skip),
        };
        let (file, line) = match &resolved {
            Some((file, line)) => (file.as_str(), *line),
            None => (location.file(), location.line()),
        };
        let fields = match fields {
            Some(fields) if !fields.is_empty() => serde_json::to_string(fields).unwrap_or_default(),
            _ => String::new(),
        };
        self.pipeline.emit(severity, file, line, &fields, message);
    }

    fn proceed(&self, _message: String) {}

    fn exit(&self, _message: String) -> ! {
        let _ = self.flush();
        std::process::exit(1)
    }

    fn unwind(&self, message: String) -> ! {
        let _ = self.flush();
        panic!("{}", message)
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("config", &self.config)
            .field("sinks", &self.sinks())
            .finish_non_exhaustive()
    }
}
