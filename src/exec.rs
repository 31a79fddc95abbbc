//! Subprocess execution.
//!
//! Every external program mdlink drives (`git`, `npm`, `sudo`, `id`) goes
//! through the [`Executor`] trait so collaborators can be exercised in tests
//! without touching the host.
use anyhow::{Context as _, Result, bail};
use std::path::Path;
use std::process::{Command, Output, Stdio};

/// Result of a command execution.
#[derive(Debug, Clone, Default)]
pub struct ExecResult {
    /// Captured standard output (empty for interactive runs).
    pub stdout: String,
    /// Captured standard error (empty for interactive runs).
    pub stderr: String,
    /// Whether the process exited successfully.
    pub success: bool,
    /// Exit code, if the process was not killed by a signal.
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Abstraction over process execution.
///
/// The production implementation is [`SystemExecutor`]; tests substitute
/// scripted executors.
pub trait Executor: Send + Sync + std::fmt::Debug {
    /// Run a command and return its output. Fails if the command exits non-zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be spawned or exits non-zero.
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Run a command in a specific directory. Fails if the command exits non-zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be spawned or exits non-zero.
    fn run_in(&self, dir: &Path, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Run a command with the terminal attached (stdin, stdout and stderr
    /// inherited), so prompts such as a sudo password reach the operator.
    ///
    /// Output is not captured. A non-zero exit is reported through
    /// [`ExecResult::success`], not as an error.
    ///
    /// # Errors
    ///
    /// Returns an error only if the program cannot be spawned.
    fn run_interactive(&self, dir: &Path, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Run a command, allowing failure (returns result without bailing).
    ///
    /// # Errors
    ///
    /// Returns an error only if the program cannot be spawned.
    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Check if a program is available on PATH.
    fn which(&self, program: &str) -> bool;
}

/// Production [`Executor`] backed by [`std::process::Command`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let mut cmd = Command::new(program);
        cmd.args(args);
        execute_checked(cmd, program)
    }

    fn run_in(&self, dir: &Path, program: &str, args: &[&str]) -> Result<ExecResult> {
        let mut cmd = Command::new(program);
        cmd.args(args).current_dir(dir);
        execute_checked(cmd, &format!("{program} in {}", dir.display()))
    }

    fn run_interactive(&self, dir: &Path, program: &str, args: &[&str]) -> Result<ExecResult> {
        let status = Command::new(program)
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .with_context(|| format!("failed to execute: {program}"))?;
        Ok(ExecResult {
            success: status.success(),
            code: status.code(),
            ..ExecResult::default()
        })
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let output = Command::new(program)
            .args(args)
            .output()
            .with_context(|| format!("failed to execute: {program}"))?;

        Ok(ExecResult::from(output))
    }

    fn which(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

/// Execute a command and return the result, bailing on non-zero exit.
fn execute_checked(mut cmd: Command, label: &str) -> Result<ExecResult> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to execute: {label}"))?;
    let result = ExecResult::from(output);
    if !result.success {
        bail!(
            "{label} failed (exit {}): {}",
            result.code.unwrap_or(-1),
            result.stderr.trim()
        );
    }
    Ok(result)
}

/// Render a program and its arguments as a single display string.
#[must_use]
pub fn command_line(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}
