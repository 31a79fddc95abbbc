//! Tracing subscriber setup: console formatter, run log file, and
//! initialisation.
//!
//! Events are routed by target:
//!
//! | target             | console                  | log file                        |
//! |--------------------|--------------------------|---------------------------------|
//! | `mdlink::stage`    | `==> msg`                | `==> msg`                       |
//! | `mdlink::dry_run`  | `[DRY RUN] msg`          | `[dry run] msg`                 |
//! | `mdlink::module`   | hidden (summary prints)  | `[module] name: status (msg)`   |
//! | anything else      | by level                 | by level                        |
use std::fs;
use std::io::Write as _;
use std::path::Path;
use std::sync::Mutex;

use tracing::field::{Field, Visit};

use super::utils::{format_utc_datetime, format_utc_time, log_file_path, strip_ansi};

/// Target for stage headers.
pub(super) const STAGE_TARGET: &str = "mdlink::stage";
/// Target for dry-run lines.
pub(super) const DRY_RUN_TARGET: &str = "mdlink::dry_run";
/// Target for per-module outcomes.
pub(super) const MODULE_TARGET: &str = "mdlink::module";
/// Environment variable holding an `EnvFilter` directive for the console.
const LOG_ENV: &str = "MDLINK_LOG";

/// The fields mdlink events carry.
#[derive(Debug, Default)]
struct EventFields {
    message: String,
    module: Option<String>,
    status: Option<String>,
}

impl EventFields {
    fn of(event: &tracing::Event<'_>) -> Self {
        let mut fields = Self::default();
        event.record(&mut fields);
        fields
    }

    /// `name: status (message)` for a module outcome.
    fn module_line(&self) -> String {
        let name = self.module.as_deref().unwrap_or("?");
        let status = self.status.as_deref().unwrap_or("?");
        if self.message.is_empty() {
            format!("{name}: {status}")
        } else {
            format!("{name}: {status} ({})", self.message)
        }
    }
}

impl Visit for EventFields {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.record_str(field, &format!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = value.to_string(),
            "module" => self.module = Some(value.to_string()),
            "status" => self.status = Some(value.to_string()),
            _ => {}
        }
    }
}

/// Render one event as a plain (uncoloured) log file line.
fn file_line(level: tracing::Level, target: &str, fields: &EventFields, ts: &str) -> String {
    let msg = strip_ansi(&fields.message);
    match (level, target) {
        (_, MODULE_TARGET) => {
            format!("[{ts}]     [module] {}", strip_ansi(&fields.module_line()))
        }
        (tracing::Level::INFO, STAGE_TARGET) => format!("[{ts}] ==> {msg}"),
        (tracing::Level::INFO, DRY_RUN_TARGET) => format!("[{ts}]     [dry run] {msg}"),
        (tracing::Level::ERROR, _) => format!("[{ts}]     [error] {msg}"),
        (tracing::Level::WARN, _) => format!("[{ts}]     [warn] {msg}"),
        (tracing::Level::DEBUG | tracing::Level::TRACE, _) => {
            format!("[{ts}]     [debug] {msg}")
        }
        _ => format!("[{ts}]     {msg}"),
    }
}

/// A [`tracing_subscriber::Layer`] that appends every event to the run's
/// log file, one timestamped line each.
#[derive(Debug)]
pub(super) struct RunLog {
    file: Mutex<fs::File>,
}

impl RunLog {
    /// Open the log file for `command` under the cache directory.
    ///
    /// Returns `None` if the cache directory cannot be created or the file
    /// cannot be opened; the run then only logs to the console.
    pub(super) fn for_command(command: &str) -> Option<Self> {
        Self::at(&log_file_path(command)?, command)
    }

    /// Truncate `path`, write a header naming the version and `command`,
    /// and return a layer appending to it.
    pub(super) fn at(path: &Path, command: &str) -> Option<Self> {
        let header = format!(
            "mdlink {} {command} started {}\n",
            crate::commands::version(),
            format_utc_datetime(),
        );
        fs::write(path, header).ok()?;
        let file = fs::OpenOptions::new().append(true).open(path).ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for RunLog {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let metadata = event.metadata();
        let line = file_line(
            *metadata.level(),
            metadata.target(),
            &EventFields::of(event),
            &format_utc_time(),
        );
        if let Ok(mut f) = self.file.lock() {
            writeln!(f, "{line}").ok();
        }
    }
}

/// Console formatter: coloured stage headers, indented messages, and no
/// per-module lines (the run summary prints those).
struct ConsoleFormat;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for ConsoleFormat
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();
        let target = metadata.target();
        if target == MODULE_TARGET {
            return Ok(());
        }
        let msg = EventFields::of(event).message;

        match *metadata.level() {
            tracing::Level::ERROR => writeln!(writer, "\x1b[31mERROR\x1b[0m {msg}"),
            tracing::Level::WARN => writeln!(writer, "\x1b[33mWARN\x1b[0m  {msg}"),
            tracing::Level::INFO if target == STAGE_TARGET => {
                writeln!(writer, "\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m")
            }
            tracing::Level::INFO if target == DRY_RUN_TARGET => {
                writeln!(writer, "  \x1b[33m[DRY RUN]\x1b[0m {msg}")
            }
            tracing::Level::INFO => writeln!(writer, "  {msg}"),
            _ => writeln!(writer, "  \x1b[2m{msg}\x1b[0m"),
        }
    }
}

/// Initialise the global [`tracing`] subscriber.
///
/// The console shows `info` and above (`debug` with `verbose`) unless
/// `MDLINK_LOG` holds an `EnvFilter` directive, which then wins. Warnings
/// and errors go to stderr, everything else to stdout. Every event at
/// `debug` and above, module outcomes included, is also appended to
/// `$XDG_CACHE_HOME/mdlink/<command>.log`.
/// Must be called once at program startup, before any logging.
pub fn init_subscriber(verbose: bool, command: &str) {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        EnvFilter, Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let console_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let console_filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::default().add_directive(console_level.into()));

    let make_writer = std::io::stderr
        .with_max_level(tracing::Level::WARN)
        .and(std::io::stdout.with_min_level(tracing::Level::INFO));

    let console_layer = fmt::layer()
        .event_format(ConsoleFormat)
        .with_writer(make_writer)
        .with_filter(console_filter);

    let run_log = RunLog::for_command(command).map(|l| l.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(run_log)
        .init();
}
