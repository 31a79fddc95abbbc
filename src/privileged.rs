//! Elevated command execution.
//!
//! Linking into the global modules directory usually needs root. Each
//! link or unlink step issues exactly one [`PrivilegedCommand`]; the
//! production [`SudoExecutor`] runs it through `sudo` with the terminal
//! attached so the credential prompt reaches the operator.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::LinkError;
use crate::exec::{Executor, command_line};

/// A single elevated operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrivilegedCommand {
    /// `npm link <source>` run from the project root. Creates the global
    /// entry pointing at `source`.
    NpmLink {
        /// Source checkout to link.
        source: PathBuf,
        /// Project the command runs in.
        project_root: PathBuf,
    },
    /// `rm -rf <path>`.
    RemoveAll {
        /// Path to delete.
        path: PathBuf,
    },
}

impl PrivilegedCommand {
    /// Program and arguments, without any elevation prefix.
    #[must_use]
    pub fn argv(&self) -> (&'static str, Vec<String>) {
        match self {
            Self::NpmLink { source, .. } => (
                "npm",
                vec!["link".to_string(), source.to_string_lossy().into_owned()],
            ),
            Self::RemoveAll { path } => (
                "rm",
                vec!["-rf".to_string(), path.to_string_lossy().into_owned()],
            ),
        }
    }

    /// Directory the command runs in.
    #[must_use]
    pub fn working_dir(&self) -> &Path {
        match self {
            Self::NpmLink { project_root, .. } => project_root,
            Self::RemoveAll { path } => path.parent().unwrap_or_else(|| Path::new("/")),
        }
    }
}

/// Runs [`PrivilegedCommand`]s with elevated rights.
pub trait PrivilegedExecutor: Send + Sync + std::fmt::Debug {
    /// Run `command`, returning once it has finished.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Privilege`] if elevation is denied or the
    /// command exits non-zero.
    fn execute(&self, command: &PrivilegedCommand) -> Result<(), LinkError>;
}

/// How elevated commands are launched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Elevation {
    /// Prefix every command with `sudo`.
    Sudo,
    /// Run commands as the current user (already root, or `--no-sudo`).
    Direct,
}

impl Elevation {
    /// Pick `Direct` when sudo is disabled or the effective user is root.
    pub fn detect(executor: &dyn Executor, allow_sudo: bool) -> Self {
        if !allow_sudo {
            return Self::Direct;
        }
        let is_root = executor
            .run_unchecked("id", &["-u"])
            .is_ok_and(|r| r.success && r.stdout.trim() == "0");
        if is_root { Self::Direct } else { Self::Sudo }
    }
}

/// Production [`PrivilegedExecutor`].
#[derive(Debug)]
pub struct SudoExecutor {
    executor: Arc<dyn Executor>,
    elevation: Elevation,
}

impl SudoExecutor {
    /// Create an executor with an explicit elevation mode.
    #[must_use]
    pub fn new(executor: Arc<dyn Executor>, elevation: Elevation) -> Self {
        Self {
            executor,
            elevation,
        }
    }

    /// The full command line this executor would run for `command`.
    #[must_use]
    pub fn display(&self, command: &PrivilegedCommand) -> String {
        let (program, args) = command.argv();
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        match self.elevation {
            Elevation::Sudo => format!("sudo {}", command_line(program, &args)),
            Elevation::Direct => command_line(program, &args),
        }
    }
}

impl PrivilegedExecutor for SudoExecutor {
    fn execute(&self, command: &PrivilegedCommand) -> Result<(), LinkError> {
        let (program, args) = command.argv();
        let mut full: Vec<&str> = Vec::with_capacity(args.len() + 1);
        let launcher = match self.elevation {
            Elevation::Sudo => {
                full.push(program);
                "sudo"
            }
            Elevation::Direct => program,
        };
        full.extend(args.iter().map(String::as_str));

        let display = self.display(command);
        let result = self
            .executor
            .run_interactive(command.working_dir(), launcher, &full)
            .map_err(|e| LinkError::Privilege {
                command: display.clone(),
                reason: format!("{e:#}"),
            })?;
        if !result.success {
            return Err(LinkError::Privilege {
                command: display,
                reason: result
                    .code
                    .map_or_else(|| "terminated by signal".to_string(), |c| format!("exit {c}")),
            });
        }
        Ok(())
    }
}
