//! Utility functions for path resolution, ANSI stripping, and time formatting.
use std::fs;
use std::path::{Path, PathBuf};

/// Strip ANSI escape sequences from a string.
///
/// Handles SGR sequences (ending in `m`) and other CSI sequences (ending
/// in any letter in the `@`..`~` range), so cursor movement, erase, etc.
/// are also stripped without consuming unrelated text.
pub(super) fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            if let Some(next) = chars.next()
                && next == '['
            {
                for inner in chars.by_ref() {
                    if ('@'..='~').contains(&inner) {
                        break;
                    }
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Resolve the cache root from `XDG_CACHE_HOME`, falling back to
/// `<home>/.cache`.
fn cache_root(xdg_cache_home: Option<&Path>, home: Option<&Path>) -> PathBuf {
    xdg_cache_home.map_or_else(
        || home.unwrap_or_else(|| Path::new(".")).join(".cache"),
        Path::to_path_buf,
    )
}

/// Return the `$XDG_CACHE_HOME/mdlink/` directory, creating it if needed.
fn mdlink_cache_dir() -> Option<PathBuf> {
    let xdg = std::env::var_os("XDG_CACHE_HOME").map(PathBuf::from);
    let home = std::env::var_os("HOME").map(PathBuf::from);
    let dir = cache_root(xdg.as_deref(), home.as_deref()).join("mdlink");
    fs::create_dir_all(&dir).ok()?;
    Some(dir)
}

/// Return the log file path under `$XDG_CACHE_HOME/mdlink/` (or `~/.cache/mdlink/`).
pub(super) fn log_file_path(command: &str) -> Option<PathBuf> {
    Some(mdlink_cache_dir()?.join(format!("{command}.log")))
}

/// Format the current UTC time as `YYYY-MM-DD HH:MM:SS`.
pub(super) fn format_utc_datetime() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Format the current UTC time as `HH:MM:SS`.
pub(super) fn format_utc_time() -> String {
    chrono::Utc::now().format("%H:%M:%S").to_string()
}
