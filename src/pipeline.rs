//! Assembly of the fan-out output pipeline.
//!
//! Every sink is a `tracing_subscriber::fmt` layer with its own level filter;
//! the layers share one [`Registry`] wrapped in a [`Dispatch`] owned by the
//! logger, so each record independently reaches every sink whose floor it
//! clears.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use tracing::Dispatch;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{Layer, Registry};

use crate::encoder::RecordFormat;
use crate::{Error, Level, LoggerConfig, Result, RotatingWriter, Severity};

/// Where a sink writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkTarget {
    Console,
    /// A rotated file, identified by its stable link path.
    File(PathBuf),
}

/// A planned sink: its destination and severity floor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkSpec {
    pub floor: Level,
    pub target: SinkTarget,
}

/// Plan the sinks for `config`.
///
/// Without an output directory this is a single console sink at the configured
/// level. Otherwise there is one file sink per floor at or above the level,
/// lowest first, followed by a console sink when `console` is set.
pub fn plan(config: &LoggerConfig) -> Vec<SinkSpec> {
    if config.output_dir().is_none() {
        return vec![SinkSpec {
            floor: config.level,
            target: SinkTarget::Console,
        }];
    }

    let mut sinks: Vec<SinkSpec> = Level::ALL
        .into_iter()
        .filter(|floor| *floor >= config.level)
        .filter_map(|floor| {
            config.file_path(floor).map(|path| SinkSpec {
                floor,
                target: SinkTarget::File(path),
            })
        })
        .collect();

    if config.console {
        sinks.push(SinkSpec {
            floor: config.level,
            target: SinkTarget::Console,
        });
    }
    sinks
}

/// Console destination, stdout unless replaced.
#[derive(Clone)]
pub(crate) struct ConsoleWriter(Arc<BoxMakeWriter>);

impl ConsoleWriter {
    pub(crate) fn new<W>(make_writer: W) -> Self
    where
        W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
    {
        Self(Arc::new(BoxMakeWriter::new(make_writer)))
    }

    pub(crate) fn stdout() -> Self {
        Self::new(io::stdout)
    }
}

impl<'a> MakeWriter<'a> for ConsoleWriter {
    type Writer = Box<dyn Write + 'a>;

    fn make_writer(&'a self) -> Self::Writer {
        MakeWriter::make_writer(&*self.0)
    }
}

/// Shared handle to a file sink's writer.
#[derive(Clone)]
struct FileWriter(Arc<RotatingWriter>);

impl<'a> MakeWriter<'a> for FileWriter {
    type Writer = &'a RotatingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        &self.0
    }
}

enum SinkHandle {
    Console(ConsoleWriter),
    File(FileWriter),
}

impl SinkHandle {
    fn flush(&self) -> io::Result<()> {
        match self {
            SinkHandle::Console(console) => console.make_writer().flush(),
            SinkHandle::File(file) => file.make_writer().flush(),
        }
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

/// The assembled pipeline: one dispatch fanning out to every sink.
pub(crate) struct Pipeline {
    dispatch: Dispatch,
    floor: Level,
    caller_skip: usize,
    specs: Vec<SinkSpec>,
    handles: Vec<SinkHandle>,
}

impl Pipeline {
    /// Build the pipeline for `config`.
    ///
    /// Fails with [`Error::Init`] when a file sink's directory cannot be created.
    pub(crate) fn build(config: &LoggerConfig, console: &ConsoleWriter) -> Result<Self> {
        let format = RecordFormat::new(config);
        let policy = config.rotation_policy();
        let specs = plan(config);

        let mut layers: Vec<BoxedLayer> = Vec::with_capacity(specs.len());
        let mut handles = Vec::with_capacity(specs.len());

        for spec in &specs {
            match &spec.target {
                SinkTarget::Console => {
                    let layer = tracing_subscriber::fmt::layer()
                        .with_writer(console.clone())
                        .with_ansi(cfg!(feature = "ansi"))
                        .event_format(format.clone())
                        .with_filter(spec.floor.filter())
                        .boxed();
                    layers.push(layer);
                    handles.push(SinkHandle::Console(console.clone()));
                }
                SinkTarget::File(path) => {
                    let writer = RotatingWriter::new(path, policy).map_err(|e| {
                        Error::Init(format!("cannot set up {}: {}", path.display(), e))
                    })?;
                    let writer = FileWriter(Arc::new(writer));
                    let layer = tracing_subscriber::fmt::layer()
                        .with_writer(writer.clone())
                        .with_ansi(false)
                        .event_format(format.clone())
                        .with_filter(spec.floor.filter())
                        .boxed();
                    layers.push(layer);
                    handles.push(SinkHandle::File(writer));
                }
            }
        }

        let floor = specs
            .iter()
            .map(|spec| spec.floor)
            .min()
            .unwrap_or(config.level);

        Ok(Self {
            dispatch: Dispatch::new(tracing_subscriber::registry().with(layers)),
            floor,
            caller_skip: config.caller_skip,
            specs,
            handles,
        })
    }

    /// Console-only pipeline at the default level, used before initialization.
    pub(crate) fn console_only(console: &ConsoleWriter) -> Self {
        let config = LoggerConfig::new();
        let format = RecordFormat::new(&config);
        let layer: BoxedLayer = tracing_subscriber::fmt::layer()
            .with_writer(console.clone())
            .with_ansi(cfg!(feature = "ansi"))
            .event_format(format)
            .with_filter(config.level.filter())
            .boxed();

        Self {
            dispatch: Dispatch::new(tracing_subscriber::registry().with(vec![layer])),
            floor: config.level,
            caller_skip: 0,
            specs: plan(&config),
            handles: vec![SinkHandle::Console(console.clone())],
        }
    }

    pub(crate) fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// Wrapper frames to skip when resolving call sites.
    pub(crate) fn caller_skip(&self) -> usize {
        self.caller_skip
    }

    pub(crate) fn specs(&self) -> &[SinkSpec] {
        &self.specs
    }

    /// Whether any sink would accept a record of `severity`.
    pub(crate) fn enabled(&self, severity: Severity) -> bool {
        severity.floor() >= self.floor
    }

    /// Send one record through every sink.
    pub(crate) fn emit(
        &self,
        severity: Severity,
        file: &str,
        line: u32,
        fields: &str,
        message: &str,
    ) {
        macro_rules! record {
            ($level:expr) => {
                tracing::event!(
                    target: "tierlog",
                    $level,
                    tierlog.severity = severity.as_str(),
                    tierlog.file = file,
                    tierlog.line = line,
                    tierlog.fields = fields,
                    "{}",
                    message
                )
            };
        }

        tracing::dispatcher::with_default(&self.dispatch, || match severity.floor() {
            Level::Debug => record!(tracing::Level::DEBUG),
            Level::Info => record!(tracing::Level::INFO),
            Level::Warn => record!(tracing::Level::WARN),
            Level::Error => record!(tracing::Level::ERROR),
        });
    }

    /// Flush every sink, returning the first failure.
    pub(crate) fn flush(&self) -> Result<()> {
        let mut first_err = None;
        for (spec, handle) in self.specs.iter().zip(&self.handles) {
            if let Err(source) = handle.flush()
                && first_err.is_none()
            {
                let sink = match &spec.target {
                    SinkTarget::Console => "console".to_string(),
                    SinkTarget::File(path) => path.display().to_string(),
                };
                first_err = Some(Error::Flush { sink, source });
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn files(specs: &[SinkSpec]) -> Vec<(Level, PathBuf)> {
        specs
            .iter()
            .filter_map(|spec| match &spec.target {
                SinkTarget::File(path) => Some((spec.floor, path.clone())),
                SinkTarget::Console => None,
            })
            .collect()
    }

    #[test]
    fn test_plan_console_only_without_directory() {
        for level in Level::ALL {
            let config = LoggerConfig::new().with_level(level).with_console(false);
            assert_eq!(
                plan(&config),
                vec![SinkSpec {
                    floor: level,
                    target: SinkTarget::Console
                }]
            );
        }
    }

    #[test]
    fn test_plan_one_file_per_enabled_floor() {
        let config = LoggerConfig::new()
            .with_level(Level::Warn)
            .with_output_file("log", Some("demo".to_string()));
        let specs = plan(&config);
        assert_eq!(
            files(&specs),
            vec![
                (Level::Warn, Path::new("log/demo_warn.log").to_path_buf()),
                (Level::Error, Path::new("log/demo_err.log").to_path_buf()),
            ]
        );
        assert!(!specs.iter().any(|s| s.target == SinkTarget::Console));
    }

    #[test]
    fn test_plan_console_appended_last() {
        let config = LoggerConfig::new()
            .with_level(Level::Debug)
            .with_output_file("log", None)
            .with_console(true);
        let specs = plan(&config);
        assert_eq!(specs.len(), 5);
        assert_eq!(
            specs.last(),
            Some(&SinkSpec {
                floor: Level::Debug,
                target: SinkTarget::Console
            })
        );
        assert_eq!(files(&specs).len(), 4);
    }

    #[test]
    fn test_plan_is_idempotent() {
        let once = LoggerConfig::new()
            .with_level(Level::Info)
            .with_output_file("log", Some("demo".to_string()));
        let twice = once
            .clone()
            .with_level(Level::Info)
            .with_output_file("log", Some("demo".to_string()));
        assert_eq!(plan(&once), plan(&twice));
    }

    #[test]
    fn test_build_reports_unusable_directory() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, b"").unwrap();

        let config = LoggerConfig::new().with_output_file(blocker.join("logs"), None);
        let result = Pipeline::build(&config, &ConsoleWriter::stdout());
        assert!(matches!(result, Err(Error::Init(_))));
    }

    #[test]
    fn test_enabled_tracks_lowest_floor() {
        let config = LoggerConfig::new().with_level(Level::Warn);
        let pipeline = Pipeline::build(&config, &ConsoleWriter::stdout()).unwrap();
        assert!(!pipeline.enabled(Severity::Info));
        assert!(pipeline.enabled(Severity::Warn));
        assert!(pipeline.enabled(Severity::Fatal));
    }
}
