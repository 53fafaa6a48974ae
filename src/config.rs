use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::context::{Context, FieldFn, Fields};
use crate::rotation::duration_serde;
use crate::{Level, RotationPolicy};

/// How the source location of a record is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallerFormat {
    /// Last directory and file name, e.g. `src/main.rs:12`.
    Short,
    /// The path as recorded by the compiler.
    #[default]
    Full,
}

impl CallerFormat {
    /// Render a `file:line` location.
    pub fn render(self, file: &str, line: u32) -> String {
        match self {
            CallerFormat::Full => format!("{}:{}", file, line),
            CallerFormat::Short => format!("{}:{}", trim_path(file), line),
        }
    }
}

/// Keep the last two components of a path.
fn trim_path(file: &str) -> &str {
    let is_sep = |c: char| c == '/' || c == '\\';
    match file.rfind(is_sep) {
        Some(last) => match file[..last].rfind(is_sep) {
            Some(prev) => &file[prev + 1..],
            None => file,
        },
        None => file,
    }
}

/// Record encoding shared by every sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    /// Tab-separated, human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Configuration for a logger
#[derive(Clone, Serialize, Deserialize)]
pub struct LoggerConfig {
    /// Label attached to every record
    #[serde(default)]
    pub name: Option<String>,
    /// Minimum level; records below it are dropped
    #[serde(default)]
    pub level: Level,
    /// Caller rendering
    #[serde(default)]
    pub caller: CallerFormat,
    /// Text or JSON output
    #[serde(default)]
    pub encoding: Encoding,
    /// Directory for per-level files; file output is off when unset
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    /// Base name for per-level files
    #[serde(default)]
    pub file_name: Option<String>,
    /// How long rotated files are kept (zero means 30 days)
    #[serde(default, with = "duration_serde")]
    pub file_max_age: Duration,
    /// How often files rotate (zero means 24 hours)
    #[serde(default, with = "duration_serde")]
    pub file_rotation: Duration,
    /// Also write to the console when file output is enabled
    #[serde(default)]
    pub console: bool,
    /// Caller depth adjustment for wrappers
    #[serde(default)]
    pub caller_skip: usize,
    /// Derives extra fields from a context for the context call shapes
    #[serde(skip)]
    pub field_fn: Option<FieldFn>,
}

impl LoggerConfig {
    /// Create a new LoggerConfig with defaults
    pub fn new() -> Self {
        Self {
            name: None,
            level: Level::Info,
            caller: CallerFormat::Full,
            encoding: Encoding::Text,
            output_dir: None,
            file_name: None,
            file_max_age: Duration::ZERO,
            file_rotation: Duration::ZERO,
            console: false,
            caller_skip: 0,
            field_fn: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_caller(mut self, caller: CallerFormat) -> Self {
        self.caller = caller;
        self
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Enable file output under `dir`, naming files after `file_name` when given.
    pub fn with_output_file(mut self, dir: impl Into<PathBuf>, file_name: Option<String>) -> Self {
        self.output_dir = Some(dir.into());
        self.file_name = file_name;
        self
    }

    pub fn with_file_rotate(mut self, max_age: Duration, rotation: Duration) -> Self {
        self.file_max_age = max_age;
        self.file_rotation = rotation;
        self
    }

    pub fn with_console(mut self, console: bool) -> Self {
        self.console = console;
        self
    }

    pub fn with_caller_skip(mut self, skip: usize) -> Self {
        self.caller_skip = skip;
        self
    }

    pub fn with_field_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&Context, &mut Fields) + Send + Sync + 'static,
    {
        self.field_fn = Some(Arc::new(f));
        self
    }

    /// Output directory, treating an empty path as unset.
    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir
            .as_deref()
            .filter(|dir| !dir.as_os_str().is_empty())
    }

    /// Base file name, treating an empty name as unset.
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref().filter(|name| !name.is_empty())
    }

    /// Rotation parameters with the defaults applied.
    pub fn rotation_policy(&self) -> RotationPolicy {
        RotationPolicy::new(self.file_max_age, self.file_rotation)
    }

    /// Link path of the file sink for `floor`, if file output is enabled.
    pub fn file_path(&self, floor: Level) -> Option<PathBuf> {
        let dir = self.output_dir()?;
        Some(match self.file_name() {
            Some(base) => dir.join(format!("{}_{}.log", base, floor.file_suffix())),
            None => dir.join(floor.default_file_name()),
        })
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LoggerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerConfig")
            .field("name", &self.name)
            .field("level", &self.level)
            .field("caller", &self.caller)
            .field("encoding", &self.encoding)
            .field("output_dir", &self.output_dir)
            .field("file_name", &self.file_name)
            .field("file_max_age", &self.file_max_age)
            .field("file_rotation", &self.file_rotation)
            .field("console", &self.console)
            .field("caller_skip", &self.caller_skip)
            .field("field_fn", &self.field_fn.as_ref().map(|_| "Fn"))
            .finish()
    }
}
