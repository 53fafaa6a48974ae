//! # Tierlog
//!
//! A leveled structured-logging facade built on `tracing`, with per-level
//! rotating log files.
//!
//! ## Features
//!
//! - Independent [`Logger`] instances plus a process-wide default in [`global`]
//! - Text or JSON records with caller location and sorted extra fields
//! - One file per severity floor, rotated on a fixed interval and pruned by age
//! - Fields derived from a request [`Context`] through a registered callback
//! - Native `tracing` events routed to the same sinks via [`Logger::in_scope`]
//!
//! ## Example
//!
//! ```rust
//! use tierlog::{fields, Context, Level};
//!
//! let mut logger = tierlog::builder()
//!     .with_level(Level::Debug)
//!     .with_name("api")
//!     .build()?;
//! logger.add_field_fn(|ctx, fields| {
//!     if let Some(id) = ctx.value("req_id") {
//!         fields.insert("req_id".to_string(), id.clone());
//!     }
//! });
//!
//! logger.info(&[&"server started"]);
//! logger.warn_with_fields(fields! { "disk" => "/var" }, "usage at %d%%", &[&91]);
//!
//! let ctx = Context::new().with_value("req_id", "a1b2");
//! logger.info_context(&ctx, "handled in %dms", &[&12]);
//! logger.flush()?;
//! # Ok::<(), tierlog::Error>(())
//! ```

mod macros;

pub mod builder;
mod caller;
pub mod config;
pub mod context;
pub mod encoder;
pub mod error;
pub mod global;
pub mod level;
pub mod logger;
pub mod pipeline;
pub mod rotation;
pub mod template;
pub mod writer;

pub use builder::LoggerBuilder;
pub use config::{CallerFormat, Encoding, LoggerConfig};
pub use context::{Context, FieldFn, Fields};
pub use encoder::{Record, RecordFormat};
pub use error::{Error, Result};
pub use level::{Level, Severity};
pub use logger::Logger;
pub use pipeline::{SinkSpec, SinkTarget};
pub use rotation::RotationPolicy;
pub use writer::RotatingWriter;

pub use tracing_subscriber::fmt::MakeWriter;

/// Start building a [`Logger`].
pub fn builder() -> LoggerBuilder {
    LoggerBuilder::new()
}

#[doc(hidden)]
pub mod __private {
    pub use serde_json::Value;
}
