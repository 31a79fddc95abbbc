//! Structured logger with dry-run awareness and summary collection.
use std::path::PathBuf;
use std::sync::Mutex;

use super::subscriber::{DRY_RUN_TARGET, MODULE_TARGET, STAGE_TARGET};
use super::types::{Log, ModuleRecord, ModuleStatus};
use super::utils::log_file_path;

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
///
/// The `record_module` method is **not** included because its signature
/// differs from the `fn(&self, &str)` pattern shared by the display methods.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Structured logger with dry-run awareness and summary collection.
///
/// All messages are also written to a persistent log file at
/// `$XDG_CACHE_HOME/mdlink/<command>.log` (default `~/.cache/mdlink/<command>.log`)
/// by the subscriber's file layer, regardless of the verbose flag.
#[derive(Debug)]
pub struct Logger {
    modules: Mutex<Vec<ModuleRecord>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a new logger for `command`.
    ///
    /// Stores the log file path for display in the run summary. The file
    /// itself is written by [`init_subscriber`](super::subscriber::init_subscriber).
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self::with_log_file(log_file_path(command))
    }

    /// Create a logger that reports `log_file` in its summary.
    #[must_use]
    pub const fn with_log_file(log_file: Option<PathBuf>) -> Self {
        Self {
            modules: Mutex::new(Vec::new()),
            log_file,
        }
    }

    /// Return the log file path, if available.
    #[must_use]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Return a clone of all recorded module outcomes.
    #[must_use]
    pub fn module_records(&self) -> Vec<ModuleRecord> {
        self.modules.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (suppressed on console unless verbose; always
    /// written to the log file).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log a dry-run action message.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: DRY_RUN_TARGET, "{msg}");
    }

    /// Record a module outcome for the summary and the log file.
    pub fn record_module(&self, name: &str, status: ModuleStatus, message: Option<&str>) {
        let (detail, label) = (message.unwrap_or_default(), status.label());
        if status == ModuleStatus::Failed {
            tracing::error!(target: MODULE_TARGET, module = name, status = label, "{detail}");
        } else {
            tracing::info!(target: MODULE_TARGET, module = name, status = label, "{detail}");
        }
        if let Ok(mut guard) = self.modules.lock() {
            guard.push(ModuleRecord {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Print the summary of all recorded modules.
    #[allow(clippy::print_stdout)]
    pub fn print_summary(&self) {
        let modules = self.module_records();
        if modules.is_empty() {
            return;
        }

        println!();
        self.stage("Summary");

        let mut ok = 0u32;
        let mut already_ok = 0u32;
        let mut dry_run = 0u32;
        let mut failed = 0u32;

        for module in &modules {
            let (icon, color) = match module.status {
                ModuleStatus::Ok => {
                    ok += 1;
                    ("✓", "\x1b[32m")
                }
                ModuleStatus::AlreadyOk => {
                    already_ok += 1;
                    ("·", "\x1b[2m")
                }
                ModuleStatus::DryRun => {
                    dry_run += 1;
                    ("~", "\x1b[37m")
                }
                ModuleStatus::Failed => {
                    failed += 1;
                    ("✗", "\x1b[31m")
                }
            };

            let suffix = module
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));

            self.info(&format!("{color}{icon} {}{suffix}\x1b[0m", module.name));
        }

        println!();
        let total = ok + already_ok + dry_run + failed;
        self.info(&format!(
            "{total} modules: \x1b[32m{ok} changed\x1b[0m, \x1b[2m{already_ok} already ok\x1b[0m, \x1b[37m{dry_run} dry-run\x1b[0m, \x1b[31m{failed} failed\x1b[0m"
        ));

        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error, dry_run);

    fn record_module(&self, name: &str, status: ModuleStatus, message: Option<&str>) {
        self.record_module(name, status, message);
    }
}
