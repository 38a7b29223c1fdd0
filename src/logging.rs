//! Log stream setup.
//!
//! Every line has the shape `<timestamp> - <LEVEL> - <message>`. The log
//! file is appended to at the configured level; the console (stderr) always
//! receives debug output unless `PATH_WATCHER_LOG` narrows it.

use crate::config::LogLevel;
use crate::error::{Result, WatchError};
use crate::utils::paths::ensure_parent_dirs;
use std::fmt;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing::level_filters::LevelFilter;
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer};

/// Environment variable overriding the console filter (`EnvFilter` syntax)
pub const LOG_ENV: &str = "PATH_WATCHER_LOG";

/// Local-time timestamp, millisecond precision
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// `<timestamp> - <LEVEL> - <message>` line format
#[derive(Debug, Clone, Copy, Default)]
pub struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let now = chrono::Local::now().format(TIMESTAMP_FORMAT);
        write!(writer, "{now} - {} - ", event.metadata().level())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

fn console_filter(default: LevelFilter) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::default().add_directive(default.into()))
}

/// Install the file + console logger used while watching.
///
/// # Errors
///
/// Returns [`WatchError::Write`] if the log file cannot be opened, or
/// [`WatchError::Configuration`] if a global logger is already installed.
pub fn init(log_path: &Path, level: LogLevel) -> Result<()> {
    ensure_parent_dirs(log_path)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .map_err(|e| WatchError::write(log_path, e))?;

    let file_layer = tracing_subscriber::fmt::layer()
        .event_format(LineFormat)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_filter(level.as_filter());

    let console_layer = tracing_subscriber::fmt::layer()
        .event_format(LineFormat)
        .with_writer(std::io::stderr)
        .with_filter(console_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| WatchError::config(format!("Failed to install logger: {e}")))
}

/// Install a console-only logger for one-shot commands.
///
/// # Errors
///
/// Returns [`WatchError::Configuration`] if a global logger is already installed.
pub fn init_console(default: LevelFilter) -> Result<()> {
    let console_layer = tracing_subscriber::fmt::layer()
        .event_format(LineFormat)
        .with_writer(std::io::stderr)
        .with_filter(console_filter(default));

    tracing_subscriber::registry()
        .with(console_layer)
        .try_init()
        .map_err(|e| WatchError::config(format!("Failed to install logger: {e}")))
}
