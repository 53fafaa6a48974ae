//! The process-wide default logger.
//!
//! Every function here forwards to one lazily created [`Logger`]. Until it is
//! configured it logs text records at `Info` to stdout.
//!
//! The logging calls hold a read lock on the default logger while they run,
//! enricher included. A field callback must not call [`configure`],
//! [`add_field_fn`], [`init_logger`], [`try_init_logger`] or [`replace`]: on
//! the same thread that deadlocks.
//!
//! ```rust,no_run
//! use tierlog::{global, Level};
//!
//! global::configure(|logger| {
//!     logger.set_level(Level::Debug).set_output_file("./log", Some("demo"));
//! });
//! global::init_logger();
//!
//! global::infof("listening on %d", &[&8080]);
//! global::flush().ok();
//! ```

use std::fmt::Display;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use once_cell::sync::Lazy;

use crate::context::{Context, Fields};
use crate::{Logger, LoggerConfig, Result};

static LOGGER: Lazy<RwLock<Logger>> = Lazy::new(|| RwLock::new(Logger::new()));

fn read() -> RwLockReadGuard<'static, Logger> {
    LOGGER.read().unwrap_or_else(PoisonError::into_inner)
}

fn write() -> RwLockWriteGuard<'static, Logger> {
    LOGGER.write().unwrap_or_else(PoisonError::into_inner)
}

/// Change the default logger's settings; call [`init_logger`] to apply them.
pub fn configure<T>(f: impl FnOnce(&mut Logger) -> T) -> T {
    f(&mut write())
}

/// Rebuild the default logger's pipeline, panicking on setup failure.
pub fn init_logger() {
    write().init_logger();
}

pub fn try_init_logger() -> Result<()> {
    write().try_init_logger()
}

/// Swap in a logger built elsewhere, returning the previous one.
pub fn replace(logger: Logger) -> Logger {
    std::mem::replace(&mut *write(), logger)
}

/// A snapshot of the default logger's configuration.
pub fn config() -> LoggerConfig {
    read().config().clone()
}

pub fn flush() -> Result<()> {
    read().flush()
}

pub fn add_field_fn<F>(f: F)
where
    F: Fn(&Context, &mut Fields) + Send + Sync + 'static,
{
    write().add_field_fn(f);
}

/// Run `f` with the default logger's pipeline as the current `tracing` dispatcher.
///
/// The lock is released before `f` runs, so `f` may reconfigure the default
/// logger.
pub fn in_scope<T>(f: impl FnOnce() -> T) -> T {
    let dispatch = read().dispatch();
    tracing::dispatcher::with_default(&dispatch, f)
}

macro_rules! forward {
    ($(-> $ret:ty;)? $plain:ident, $template:ident, $with_fields:ident, $context:ident, $context_with_fields:ident) => {
        #[track_caller]
        pub fn $plain(args: &[&dyn Display]) $(-> $ret)? {
            read().$plain(args)
        }

        #[track_caller]
        pub fn $template(template: &str, args: &[&dyn Display]) $(-> $ret)? {
            read().$template(template, args)
        }

        #[track_caller]
        pub fn $with_fields(fields: Fields, template: &str, args: &[&dyn Display]) $(-> $ret)? {
            read().$with_fields(fields, template, args)
        }

        #[track_caller]
        pub fn $context(ctx: &Context, template: &str, args: &[&dyn Display]) $(-> $ret)? {
            read().$context(ctx, template, args)
        }

        #[track_caller]
        pub fn $context_with_fields(
            ctx: &Context,
            fields: Fields,
            template: &str,
            args: &[&dyn Display],
        ) $(-> $ret)? {
            read().$context_with_fields(ctx, fields, template, args)
        }
    };
}

forward!(debug, debugf, debug_with_fields, debug_context, debug_context_with_fields);
forward!(info, infof, info_with_fields, info_context, info_context_with_fields);
forward!(warn, warnf, warn_with_fields, warn_context, warn_context_with_fields);
forward!(error, errorf, error_with_fields, error_context, error_context_with_fields);
forward!(-> !; fatal, fatalf, fatal_with_fields, fatal_context, fatal_context_with_fields);
forward!(-> !; panic, panicf, panic_with_fields, panic_context, panic_context_with_fields);
