use std::{
    fs::File,
    io::{self, IsTerminal},
    path::Path,
    sync::Mutex,
};

use anyhow::{Context, Result};
use chrono::Local;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{
        FmtContext,
        format::{FormatEvent, FormatFields, Writer},
    },
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

/// Local-time event formatter shared by the terminal and file layers.
struct LocalFmt;

impl<S, N> FormatEvent<S, N> for LocalFmt
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        let ansi = writer.has_ansi_escapes();

        if ansi {
            write!(writer, "\x1b[2m")?
        }
        write!(
            writer,
            "{} ",
            Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )?;
        if ansi {
            write!(writer, "\x1b[0m")?
        }

        let (pre, post) = if ansi { level_style(meta.level()) } else { ("", "") };
        write!(writer, "{}{:>5}{} ", pre, meta.level(), post)?;

        if let Some(target) = short_target(meta.target()) {
            if ansi {
                write!(writer, "\x1b[36m{target}\x1b[0m ")?;
            } else {
                write!(writer, "{target} ")?;
            }
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

fn level_style(level: &Level) -> (&'static str, &'static str) {
    match *level {
        Level::ERROR => ("\x1b[1;31m", "\x1b[0m"),
        Level::WARN => ("\x1b[1;33m", "\x1b[0m"),
        Level::INFO => ("\x1b[1;32m", "\x1b[0m"),
        Level::DEBUG => ("\x1b[1;34m", "\x1b[0m"),
        Level::TRACE => ("\x1b[1;35m", "\x1b[0m"),
    }
}

/// Crate name of an event target, `lonn_db_sqlite::repository` -> `lonn_db_sqlite`.
fn short_target(target: &str) -> Option<&str> {
    target.split("::").next().filter(|t| !t.is_empty())
}

/// Builds the level filter. `RUST_LOG` wins over the configured level.
fn make_filter(level: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| anyhow::anyhow!("invalid log level '{level}': {e}")),
    }
}

/// Initializes logging. Call once at startup.
///
/// - Stderr: colored when attached to a terminal, plain when piped. Command
///   output on stdout stays clean.
/// - File: appended to when `file` is set. The directory must already exist.
pub fn init(
    level: &str,
    file: Option<&Path>,
) -> Result<()> {
    let filter = make_filter(level)?;

    let file_layer = match file {
        Some(path) => {
            let file = File::options()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file '{}'", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .event_format(LocalFmt)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .event_format(LocalFmt)
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer.and_then(file_layer))
        .try_init()
        .context("logging already initialized")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn short_target_keeps_crate_name() {
        assert_eq!(short_target("lonn_db_sqlite::repository"), Some("lonn_db_sqlite"));
        assert_eq!(short_target("lonn"), Some("lonn"));
        assert_eq!(short_target(""), None);
    }

    #[test]
    fn every_level_has_a_reset_suffix() {
        for level in [Level::ERROR, Level::WARN, Level::INFO, Level::DEBUG, Level::TRACE] {
            let (pre, post) = level_style(&level);
            assert!(pre.starts_with("\x1b["));
            assert_eq!(post, "\x1b[0m");
        }
    }

    #[test]
    fn bad_level_directive_is_reported() {
        // Only meaningful when RUST_LOG is not overriding the level.
        if std::env::var_os("RUST_LOG").is_none() {
            let err = make_filter("lonn=loud").unwrap_err();
            assert!(err.to_string().contains("invalid log level"));
        }
    }
}
