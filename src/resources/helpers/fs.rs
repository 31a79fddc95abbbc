//! File-system helpers shared by the link and source resources.
use std::path::{Component, Path, PathBuf};

use crate::error::LinkError;

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<(), LinkError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| LinkError::io(parent, e))?;
    }
    Ok(())
}

/// Whether anything occupies `path`, including a dangling symlink.
#[must_use]
pub fn entry_exists(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

/// Whether `path` itself is a symbolic link (dangling or not).
#[must_use]
pub fn is_symlink(path: &Path) -> bool {
    path.symlink_metadata().is_ok_and(|m| m.is_symlink())
}

/// Remove whatever occupies `path`: a symlink is unlinked without touching
/// its target, a directory is removed recursively. Does nothing if `path`
/// does not exist.
///
/// # Errors
///
/// Returns an error if the entry exists but cannot be removed.
pub fn remove_any(path: &Path) -> Result<(), LinkError> {
    let Ok(meta) = path.symlink_metadata() else {
        return Ok(());
    };
    let result = if meta.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        remove_symlink(path)
    };
    result.map_err(|e| LinkError::io(path, e))
}

/// Whether `path` is a directory with no entries. Unreadable directories
/// count as non-empty.
#[must_use]
pub fn dir_is_empty(path: &Path) -> bool {
    std::fs::read_dir(path).is_ok_and(|mut entries| entries.next().is_none())
}

/// Whether `path` looks like a version-control checkout.
#[must_use]
pub fn is_checkout(path: &Path) -> bool {
    entry_exists(&path.join(".git"))
}

/// The target `link` points at, if it is a symlink.
#[must_use]
pub fn link_target(link: &Path) -> Option<PathBuf> {
    std::fs::read_link(link).ok()
}

/// Whether `link` is a symlink whose target is `target`.
///
/// Relative link targets are resolved against the link's directory. Only
/// the parent directories are canonicalized, so a link to another symlink
/// is not mistaken for a link to that symlink's target.
#[must_use]
pub fn points_to(link: &Path, target: &Path) -> bool {
    link_target(link).is_some_and(|current| {
        let current = match link.parent() {
            Some(parent) if current.is_relative() => parent.join(current),
            _ => current,
        };
        anchor(&current) == anchor(target)
    })
}

/// Lexically normalize `path`, then canonicalize its parent directory.
fn anchor(path: &Path) -> PathBuf {
    let mut normal = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normal.pop();
            }
            other => normal.push(other),
        }
    }
    match (normal.parent(), normal.file_name()) {
        (Some(parent), Some(name)) => dunce::canonicalize(parent)
            .unwrap_or_else(|_| parent.to_path_buf())
            .join(name),
        _ => normal,
    }
}

/// Create a symlink at `link` pointing to `target`, creating the parent
/// directory first.
///
/// # Errors
///
/// Returns an error if the parent cannot be created or the link cannot be
/// written.
pub fn create_symlink(target: &Path, link: &Path) -> Result<(), LinkError> {
    ensure_parent_dir(link)?;
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(target, link).map_err(|e| LinkError::io(link, e))
    }
    #[cfg(windows)]
    {
        std::os::windows::fs::symlink_dir(target, link).map_err(|e| LinkError::io(link, e))
    }
}

/// Remove a symlink or file. Directory symlinks on Windows need
/// `remove_dir`.
fn remove_symlink(path: &Path) -> std::io::Result<()> {
    #[cfg(windows)]
    {
        if path.symlink_metadata().is_ok_and(|m| m.is_symlink()) && path.is_dir() {
            return std::fs::remove_dir(path);
        }
    }
    std::fs::remove_file(path)
}
