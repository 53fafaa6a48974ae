//! Event encoder shared by every sink of a pipeline.
//!
//! Records reach the encoder as `tracing` events. Facade calls attach their
//! severity, call site and extra fields under the `tierlog.*` field names; native
//! `tracing` events (see [`Logger::in_scope`](crate::Logger::in_scope)) fall back
//! to their metadata, and their own fields become extra fields.

use std::fmt::{self, Write as _};
use std::sync::Arc;

use serde_json::Value;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

use crate::context::Fields;
use crate::rotation::local_offset;
use crate::{CallerFormat, Encoding, LoggerConfig, Severity};

pub(crate) const SEVERITY_FIELD: &str = "tierlog.severity";
pub(crate) const FILE_FIELD: &str = "tierlog.file";
pub(crate) const LINE_FIELD: &str = "tierlog.line";
pub(crate) const FIELDS_FIELD: &str = "tierlog.fields";

const LEVEL_KEY: &str = "l";
const TIME_KEY: &str = "t";
const NAME_KEY: &str = "logger";
const CALLER_KEY: &str = "caller";
const MESSAGE_KEY: &str = "msg";

/// A decoded record, ready to encode.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub severity: Severity,
    pub caller: Option<(String, u32)>,
    pub message: String,
    pub fields: Fields,
}

/// Human-readable or JSON encoder built from a [`LoggerConfig`] snapshot.
#[derive(Debug, Clone)]
pub struct RecordFormat {
    encoding: Encoding,
    caller: CallerFormat,
    name: Option<Arc<str>>,
    offset: UtcOffset,
}

impl RecordFormat {
    pub fn new(config: &LoggerConfig) -> Self {
        Self {
            encoding: config.encoding,
            caller: config.caller,
            name: config.name.as_deref().filter(|n| !n.is_empty()).map(Arc::from),
            offset: local_offset(),
        }
    }

    /// Encode `record` as one line, without the trailing newline.
    pub fn encode(&self, record: &Record, now: OffsetDateTime, ansi: bool) -> String {
        let timestamp = format_timestamp(now);
        let caller = record
            .caller
            .as_ref()
            .map(|(file, line)| self.caller.render(file, *line));

        match self.encoding {
            Encoding::Json => {
                let mut out = String::with_capacity(128);
                out.push('{');
                push_entry(&mut out, LEVEL_KEY, &Value::from(record.severity.as_str()));
                push_entry(&mut out, TIME_KEY, &Value::from(timestamp));
                if let Some(name) = &self.name {
                    push_entry(&mut out, NAME_KEY, &Value::from(name.as_ref()));
                }
                if let Some(caller) = caller {
                    push_entry(&mut out, CALLER_KEY, &Value::from(caller));
                }
                push_entry(&mut out, MESSAGE_KEY, &Value::from(record.message.as_str()));
                for (key, value) in &record.fields {
                    push_entry(&mut out, key, value);
                }
                out.push('}');
                out
            }
            Encoding::Text => {
                let mut out = String::with_capacity(128);
                out.push_str(&timestamp);
                out.push('\t');
                if ansi {
                    let _ = write!(
                        out,
                        "\x1b[{}m{}\x1b[0m",
                        record.severity.color(),
                        record.severity.as_upper_str()
                    );
                } else {
                    out.push_str(record.severity.as_upper_str());
                }
                if let Some(name) = &self.name {
                    out.push('\t');
                    out.push_str(name);
                }
                if let Some(caller) = caller {
                    out.push('\t');
                    out.push_str(&caller);
                }
                out.push('\t');
                out.push_str(&record.message);
                if !record.fields.is_empty() {
                    out.push('\t');
                    out.push('{');
                    for (key, value) in &record.fields {
                        push_entry(&mut out, key, value);
                    }
                    out.push('}');
                }
                out
            }
        }
    }
}

impl<S, N> FormatEvent<S, N> for RecordFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut visitor = RecordVisitor::default();
        event.record(&mut visitor);

        let meta = event.metadata();
        let caller = match (visitor.file, visitor.line) {
            (Some(file), Some(line)) => Some((file, line)),
            _ => meta.file().map(|file| (file.to_string(), meta.line().unwrap_or(0))),
        };
        let record = Record {
            severity: visitor
                .severity
                .unwrap_or_else(|| Severity::from_tracing(*meta.level())),
            caller,
            message: visitor.message,
            fields: visitor.fields,
        };

        let now = OffsetDateTime::now_utc().to_offset(self.offset);
        let line = self.encode(&record, now, writer.has_ansi_escapes());
        writer.write_str(&line)?;
        writeln!(writer)
    }
}

fn format_timestamp(now: OffsetDateTime) -> String {
    now.format(format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3][offset_hour sign:mandatory][offset_minute]"
    ))
    .unwrap_or_else(|_| now.unix_timestamp().to_string())
}

/// Append `"key":value`, preceded by a comma unless the object is still empty.
fn push_entry(out: &mut String, key: &str, value: &Value) {
    if !out.ends_with('{') {
        out.push(',');
    }
    let _ = write!(out, "{}:{}", Value::from(key), value);
}

/// Collects an event's fields into a [`Record`].
#[derive(Default)]
struct RecordVisitor {
    severity: Option<Severity>,
    file: Option<String>,
    line: Option<u32>,
    message: String,
    fields: Fields,
}

impl RecordVisitor {
    fn insert(&mut self, field: &Field, value: Value) {
        self.fields.insert(field.name().to_string(), value);
    }
}

impl Visit for RecordVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            SEVERITY_FIELD => self.severity = Severity::parse(value),
            FILE_FIELD => self.file = Some(value.to_string()),
            FIELDS_FIELD => {
                if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(value) {
                    self.fields.extend(map);
                }
            }
            "message" => self.message = value.to_string(),
            _ => self.insert(field, Value::from(value)),
        }
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        if field.name() == LINE_FIELD {
            self.line = u32::try_from(value).ok();
        } else {
            self.insert(field, Value::from(value));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::from(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        let text = format!("{:?}", value);
        if field.name() == "message" {
            self.message = text;
        } else {
            self.insert(field, Value::from(text));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::datetime;

    fn record() -> Record {
        let mut fields = Fields::new();
        fields.insert("zeta".to_string(), json!(1));
        fields.insert("alpha".to_string(), json!("a"));
        Record {
            severity: Severity::Warn,
            caller: Some(("crates/app/src/handler.rs".to_string(), 42)),
            message: "disk low".to_string(),
            fields,
        }
    }

    fn now() -> OffsetDateTime {
        datetime!(2026-10-19 08:30:05.123 +8)
    }

    #[test]
    fn test_json_layout() {
        let format = RecordFormat::new(
            &LoggerConfig::new()
                .with_encoding(Encoding::Json)
                .with_caller(CallerFormat::Short)
                .with_name("api"),
        );
        let line = format.encode(&record(), now(), false);
        assert_eq!(
            line,
            r#"{"l":"warn","t":"2026-10-19T08:30:05.123+0800","logger":"api","caller":"src/handler.rs:42","msg":"disk low","alpha":"a","zeta":1}"#
        );
        let parsed: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["msg"], "disk low");
    }

    #[test]
    fn test_text_layout() {
        let format = RecordFormat::new(&LoggerConfig::new());
        let line = format.encode(&record(), now(), false);
        assert_eq!(
            line,
            "2026-10-19T08:30:05.123+0800\tWARN\tcrates/app/src/handler.rs:42\tdisk low\t{\"alpha\":\"a\",\"zeta\":1}"
        );
    }

    #[test]
    fn test_text_layout_without_fields_or_caller() {
        let format = RecordFormat::new(&LoggerConfig::new().with_name("svc"));
        let record = Record {
            severity: Severity::Fatal,
            caller: None,
            message: "bye".to_string(),
            fields: Fields::new(),
        };
        let line = format.encode(&record, now(), false);
        assert_eq!(line, "2026-10-19T08:30:05.123+0800\tFATAL\tsvc\tbye");
    }

    #[test]
    fn test_text_layout_colors_level_with_ansi() {
        let format = RecordFormat::new(&LoggerConfig::new());
        let line = format.encode(&record(), now(), true);
        assert!(line.contains("\x1b[33mWARN\x1b[0m"));
        assert!(!format.encode(&record(), now(), false).contains('\x1b'));
    }

    #[test]
    fn test_json_escapes_keys_and_message() {
        let format = RecordFormat::new(&LoggerConfig::new().with_encoding(Encoding::Json));
        let mut fields = Fields::new();
        fields.insert("we\"ird".to_string(), json!(null));
        let record = Record {
            severity: Severity::Info,
            caller: None,
            message: "line\nbreak".to_string(),
            fields,
        };
        let parsed: Value = serde_json::from_str(&format.encode(&record, now(), false)).unwrap();
        assert_eq!(parsed["msg"], "line\nbreak");
        assert!(parsed["we\"ird"].is_null());
    }
}
