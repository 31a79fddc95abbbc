//! Core logging types: per-module records, status, and the [`Log`] trait.

/// Outcome of one module for summary reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRecord {
    /// Module name from the config.
    pub name: String,
    /// Final status of the module.
    pub status: ModuleStatus,
    /// Optional detail message (e.g. the error that halted the run).
    pub message: Option<String>,
}

/// Status of a processed module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleStatus {
    /// The module was linked or unlinked.
    Ok,
    /// The module was already in the requested state.
    AlreadyOk,
    /// Dry run; the changes were only logged.
    DryRun,
    /// The module failed and halted the run.
    Failed,
}

impl ModuleStatus {
    /// Lowercase label written to the log file.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::AlreadyOk => "already ok",
            Self::DryRun => "dry run",
            Self::Failed => "failed",
        }
    }
}

/// Abstraction over logging backends.
///
/// Strategies and resources log through `Arc<dyn Log>` so tests can swap in
/// a recording implementation.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
    /// Record a module outcome for the summary.
    fn record_module(&self, name: &str, status: ModuleStatus, message: Option<&str>);
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn module_status_equality() {
        assert_eq!(ModuleStatus::Ok, ModuleStatus::Ok);
        assert_ne!(ModuleStatus::Ok, ModuleStatus::AlreadyOk);
        assert_ne!(ModuleStatus::DryRun, ModuleStatus::Failed);
    }

    #[test]
    fn labels_are_distinct() {
        let labels = [
            ModuleStatus::Ok.label(),
            ModuleStatus::AlreadyOk.label(),
            ModuleStatus::DryRun.label(),
            ModuleStatus::Failed.label(),
        ];
        for (i, a) in labels.iter().enumerate() {
            assert!(labels.iter().skip(i + 1).all(|b| a != b));
        }
    }
}
