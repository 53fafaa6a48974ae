//! Level thresholds and record severities.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing_subscriber::filter::LevelFilter;

use crate::Error;

/// Minimum level of a logger, and the severity floor of each sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    #[default]
    Info,
    #[serde(alias = "warning")]
    Warn,
    #[serde(alias = "err")]
    Error,
}

impl Level {
    /// Every floor, lowest first.
    pub const ALL: [Level; 4] = [Level::Debug, Level::Info, Level::Warn, Level::Error];

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }

    /// Per-layer filter admitting records at or above this floor.
    pub(crate) fn filter(self) -> LevelFilter {
        LevelFilter::from_level(self.as_tracing())
    }

    pub(crate) fn as_tracing(self) -> tracing::Level {
        match self {
            Level::Debug => tracing::Level::DEBUG,
            Level::Info => tracing::Level::INFO,
            Level::Warn => tracing::Level::WARN,
            Level::Error => tracing::Level::ERROR,
        }
    }

    /// Suffix used for per-level file names when a base name is configured.
    pub(crate) fn file_suffix(self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "err",
        }
    }

    /// File name used when no base name is configured.
    pub(crate) fn default_file_name(self) -> &'static str {
        match self {
            Level::Debug => "access.log",
            Level::Info => "info.log",
            Level::Warn => "warn.log",
            Level::Error => "error.log",
        }
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" | "err" => Ok(Level::Error),
            other => Err(Error::Config(format!("unknown log level: {}", other))),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of an individual record.
///
/// `Fatal` and `Panic` are terminal: they clear every floor, and the entry
/// points that emit them exit the process or unwind after logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Debug,
    Info,
    Warn,
    Error,
    Panic,
    Fatal,
}

impl Severity {
    /// The floor this severity is filtered against.
    pub fn floor(self) -> Level {
        match self {
            Severity::Debug => Level::Debug,
            Severity::Info => Level::Info,
            Severity::Warn => Level::Warn,
            Severity::Error | Severity::Panic | Severity::Fatal => Level::Error,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Severity::Panic | Severity::Fatal)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
            Severity::Panic => "panic",
            Severity::Fatal => "fatal",
        }
    }

    pub(crate) fn as_upper_str(self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Panic => "PANIC",
            Severity::Fatal => "FATAL",
        }
    }

    /// ANSI colour code for the console encoder.
    pub(crate) fn color(self) -> u8 {
        match self {
            Severity::Debug => 35,
            Severity::Info => 34,
            Severity::Warn => 33,
            Severity::Error | Severity::Panic | Severity::Fatal => 31,
        }
    }

    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s {
            "debug" => Some(Severity::Debug),
            "info" => Some(Severity::Info),
            "warn" => Some(Severity::Warn),
            "error" => Some(Severity::Error),
            "panic" => Some(Severity::Panic),
            "fatal" => Some(Severity::Fatal),
            _ => None,
        }
    }

    /// Severity of a native `tracing` event; trace collapses into debug.
    pub(crate) fn from_tracing(level: tracing::Level) -> Self {
        match level {
            tracing::Level::ERROR => Severity::Error,
            tracing::Level::WARN => Severity::Warn,
            tracing::Level::INFO => Severity::Info,
            _ => Severity::Debug,
        }
    }
}

impl From<Level> for Severity {
    fn from(level: Level) -> Self {
        match level {
            Level::Debug => Severity::Debug,
            Level::Info => Severity::Info,
            Level::Warn => Severity::Warn,
            Level::Error => Severity::Error,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
