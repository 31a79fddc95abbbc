//! Command-line surface.
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI entry point for the module linker.
#[derive(Parser, Debug)]
#[command(
    name = "mdlink",
    about = "Link local module checkouts into a project through the global modules directory",
    version
)]
pub struct Cli {
    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Config file to read (defaults to mdlink.config.json in the project)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Project root (defaults to the current directory)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,

    /// npm global prefix (defaults to `npm config get prefix`)
    #[arg(long, global = true)]
    pub prefix: Option<PathBuf>,

    /// Run privileged steps without sudo
    #[arg(long, global = true)]
    pub no_sudo: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Write a skeleton config file
    #[command(alias = "i")]
    Init,
    /// Link every configured module
    #[command(alias = "s")]
    Start,
    /// Unlink every configured module and reinstall dependencies
    #[command(alias = "r")]
    Reset,
    /// Show the link state of every configured module
    Status,
    /// Print version information
    Version,
}

impl Command {
    /// Subcommand name, used for the log file.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Start => "start",
            Self::Reset => "reset",
            Self::Status => "status",
            Self::Version => "version",
        }
    }
}
