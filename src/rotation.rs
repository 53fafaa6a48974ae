use std::path::{Path, PathBuf};
use std::time::Duration;

use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

use crate::Result;

/// Retention applied when none (or zero) is configured: 30 days.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(30 * 24 * 60 * 60);
/// Rotation interval applied when none (or zero) is configured: 24 hours.
pub const DEFAULT_ROTATION: Duration = Duration::from_secs(24 * 60 * 60);

/// Granularity of the timestamp appended to rotated file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuffixGranularity {
    /// `%Y%m%d`, used when the interval is exactly 24 hours.
    Daily,
    /// `%Y%m%d%H%M`, used for every other interval.
    Minute,
}

/// Effective rotation parameters for a file sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
    max_age: Duration,
    interval: Duration,
}

impl RotationPolicy {
    /// Build a policy, substituting the defaults for zero durations.
    pub fn new(max_age: Duration, interval: Duration) -> Self {
        Self {
            max_age: if max_age.is_zero() {
                DEFAULT_MAX_AGE
            } else {
                max_age
            },
            interval: if interval.is_zero() {
                DEFAULT_ROTATION
            } else {
                interval
            },
        }
    }

    /// How long rotated files are kept.
    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// How often a new file is started.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn granularity(&self) -> SuffixGranularity {
        if self.interval == DEFAULT_ROTATION {
            SuffixGranularity::Daily
        } else {
            SuffixGranularity::Minute
        }
    }

    /// Start of the rotation period containing `now`.
    ///
    /// Periods are aligned in `now`'s offset, so daily rotation begins at local
    /// midnight.
    pub fn period_start(&self, now: OffsetDateTime) -> OffsetDateTime {
        let interval = self.interval.as_secs().max(1) as i64;
        let offset = now.offset().whole_seconds() as i64;
        let local = now.unix_timestamp() + offset;
        let start = local - local.rem_euclid(interval) - offset;
        OffsetDateTime::from_unix_timestamp(start)
            .map(|t| t.to_offset(now.offset()))
            .unwrap_or(now)
    }

    /// Timestamp suffix for the period starting at `period_start`.
    pub fn suffix(&self, period_start: OffsetDateTime) -> Result<String> {
        let formatted = match self.granularity() {
            SuffixGranularity::Daily => {
                period_start.format(format_description!("[year][month][day]"))
            }
            SuffixGranularity::Minute => {
                period_start.format(format_description!("[year][month][day][hour][minute]"))
            }
        };
        Ok(formatted.map_err(time::error::Error::from)?)
    }

    /// Active file for the period starting at `period_start`: `<link>.<suffix>.log`.
    pub fn file_path(&self, link: &Path, period_start: OffsetDateTime) -> Result<PathBuf> {
        let suffix = self.suffix(period_start)?;
        Ok(PathBuf::from(format!("{}.{}.log", link.display(), suffix)))
    }

    /// Whether `name` is a rotated file belonging to the link file `link_name`.
    pub(crate) fn is_rotated_name(link_name: &str, name: &str) -> bool {
        name.strip_prefix(link_name)
            .and_then(|rest| rest.strip_prefix('.'))
            .and_then(|rest| rest.strip_suffix(".log"))
            .is_some_and(|stamp| !stamp.is_empty() && stamp.bytes().all(|b| b.is_ascii_digit()))
    }
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }
}

/// Offset used for file timestamps, UTC when the local offset is unavailable.
pub(crate) fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

/// Parse a duration with an optional unit (s/m/h/d, case-insensitive), defaulting to seconds.
fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    let Some(last) = s.chars().last() else {
        return Err("empty duration string".to_string());
    };

    let (num_str, unit) = if last.is_alphabetic() {
        (&s[..s.len() - last.len_utf8()], last.to_ascii_lowercase())
    } else {
        (s, 's')
    };

    let num: u64 = num_str
        .trim()
        .parse()
        .map_err(|_| format!("invalid number: {}", num_str))?;

    let multiplier = match unit {
        's' => 1,
        'm' => 60,
        'h' => 60 * 60,
        'd' => 24 * 60 * 60,
        _ => return Err(format!("invalid unit: {}, supported: s/m/h/d", unit)),
    };

    num.checked_mul(multiplier)
        .map(Duration::from_secs)
        .ok_or_else(|| "duration too large".to_string())
}

/// Render a duration in the largest whole unit `parse_duration` understands.
fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs == 0 {
        return "0s".to_string();
    }
    for (unit, size) in [('d', 24 * 60 * 60), ('h', 60 * 60), ('m', 60)] {
        if secs % size == 0 {
            return format!("{}{}", secs / size, unit);
        }
    }
    format!("{}s", secs)
}

/// Serde adapter for durations written as seconds or unit-suffixed strings.
pub(crate) mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum DurationValue {
        Number(u64),
        String(String),
    }

    pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_duration(*value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        match DurationValue::deserialize(deserializer)? {
            DurationValue::Number(secs) => Ok(Duration::from_secs(secs)),
            DurationValue::String(s) => super::parse_duration(&s).map_err(de::Error::custom),
        }
    }
}
