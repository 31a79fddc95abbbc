//! Domain-specific error types for mdlink.
//!
//! Internal modules return typed errors ([`ConfigError`], [`LinkError`])
//! while command handlers at the CLI boundary convert them to
//! [`anyhow::Error`] via the standard `?` operator.
//!
//! - [`ConfigError`]: reading, parsing or writing `mdlink.config.json`
//! - [`LinkError`]: anything that halts a link or unlink run
//!
//! Every [`LinkError`] is fatal to the run that produced it: there is no
//! retry and no rollback of modules that were already processed.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that arise from loading or writing the configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read or written.
    #[error("IO error on config file {}: {source}", .path.display())]
    Io {
        /// Path of the config file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid JSON or does not match the expected shape.
    #[error("Invalid config file {}: {source}", .path.display())]
    Parse {
        /// Path of the config file.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// `init` refused to overwrite an existing config file.
    #[error("{} already exists", .0.display())]
    AlreadyExists(PathBuf),

    /// The skeleton could not be serialized.
    #[error("Cannot serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors that halt a link or unlink run.
#[derive(Error, Debug)]
pub enum LinkError {
    /// The module list is empty, or a module declares no source.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The global modules directory is missing or not a recognized location.
    #[error("Environment error: {0}")]
    Environment(String),

    /// A module declares a `path` without a `url` and the path is missing.
    #[error("Module '{module}': {} does not exist", .path.display())]
    PathNotFound {
        /// Module name from the config.
        module: String,
        /// The declared path.
        path: PathBuf,
    },

    /// The elevated command failed or elevation was denied.
    #[error("Privileged command '{command}' failed: {reason}")]
    Privilege {
        /// The command line that was attempted.
        command: String,
        /// Human-readable reason, usually the exit status.
        reason: String,
    },

    /// Cloning a module's repository failed.
    #[error("Cannot clone {url} into {}: {reason}", .dest.display())]
    Clone {
        /// Repository URL.
        url: String,
        /// Destination directory.
        dest: PathBuf,
        /// Human-readable reason.
        reason: String,
    },

    /// The privileged link step succeeded but left the chain incomplete.
    #[error("Module '{module}': {reason}")]
    Link {
        /// Module name from the config.
        module: String,
        /// Human-readable reason.
        reason: String,
    },

    /// Reinstalling the project's dependencies after unlinking failed.
    #[error("Dependency reinstall failed: {0}")]
    Reinstall(String),

    /// A local (unprivileged) filesystem step failed.
    #[error("IO error at {}: {source}", .path.display())]
    Io {
        /// Path the failing operation touched.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

impl LinkError {
    /// Wrap an I/O error with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
