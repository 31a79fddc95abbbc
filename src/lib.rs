//! Module linker for npm projects.
//!
//! Replaces a project's copies of selected packages with live symlinks to
//! local working checkouts, through the global modules directory, and
//! reverses the substitution on demand:
//!
//! ```text
//! <project>/node_modules/<name>  ->  <global modules dir>/<name>  ->  <source checkout>
//! ```
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]**: parse and validate `mdlink.config.json`
//! - **[`resources`]**: idempotent source and link-chain primitives
//! - **[`tasks`]**: the ordered traversal and its link/unlink strategies
//! - **[`commands`]**: top-level subcommand orchestration (`init`, `start`, `reset`, `status`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod environment;
pub mod error;
pub mod exec;
pub mod git;
pub mod logging;
pub mod npm;
pub mod privileged;
pub mod resources;
pub mod tasks;
