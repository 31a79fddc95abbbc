//! Where a run reads and writes: the global modules directory and the
//! consuming project.
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::LinkError;
use crate::npm::global_modules_dir;

/// Inputs used to build the set of recognized global module directories.
#[derive(Debug, Clone, Default)]
pub struct GlobalPathSources {
    /// The user's home directory.
    pub home: Option<PathBuf>,
    /// Raw `NODE_PATH` value.
    pub node_path: Option<OsString>,
    /// Raw `npm_config_prefix` value.
    pub npm_config_prefix: Option<PathBuf>,
    /// Location of the `node` binary on `PATH`.
    pub node_binary: Option<PathBuf>,
}

impl GlobalPathSources {
    /// Read the sources from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            home: std::env::var_os("HOME").map(PathBuf::from),
            node_path: std::env::var_os("NODE_PATH"),
            npm_config_prefix: std::env::var_os("npm_config_prefix").map(PathBuf::from),
            node_binary: which::which("node").ok(),
        }
    }

    /// Every directory a global package may live in on this host.
    ///
    /// Covers the system prefixes, the per-user npm and node locations,
    /// `NODE_PATH`, an explicit `npm_config_prefix`, and the prefix the
    /// active `node` binary was installed under (nvm and similar managers).
    #[must_use]
    pub fn recognized_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = vec![
            PathBuf::from("/usr/lib/node_modules"),
            PathBuf::from("/usr/local/lib/node_modules"),
        ];
        if let Some(home) = &self.home {
            dirs.push(global_modules_dir(&home.join(".npm-global")));
            dirs.push(home.join(".node_modules"));
            dirs.push(home.join(".node_libraries"));
        }
        if let Some(node_path) = &self.node_path {
            dirs.extend(std::env::split_paths(node_path).filter(|p| !p.as_os_str().is_empty()));
        }
        if let Some(prefix) = &self.npm_config_prefix {
            dirs.push(global_modules_dir(prefix));
        }
        // <prefix>/bin/node -> <prefix>/lib/node_modules
        if let Some(prefix) = self
            .node_binary
            .as_deref()
            .and_then(Path::parent)
            .and_then(Path::parent)
        {
            dirs.push(global_modules_dir(prefix));
        }
        dirs.dedup();
        dirs
    }
}

/// The directories a single run operates on.
#[derive(Debug, Clone)]
pub struct Environment {
    /// `<prefix>/lib/node_modules`.
    pub global_modules_dir: PathBuf,
    /// Root of the consuming project (holds `node_modules/`).
    pub project_root: PathBuf,
    /// Global directories considered valid link targets.
    pub recognized: Vec<PathBuf>,
}

impl Environment {
    /// Build an environment for the npm `prefix` and `project_root`,
    /// recognizing the directories reported by `sources`.
    #[must_use]
    pub fn new(prefix: &Path, project_root: PathBuf, sources: &GlobalPathSources) -> Self {
        Self {
            global_modules_dir: global_modules_dir(prefix),
            project_root,
            recognized: sources.recognized_dirs(),
        }
    }

    /// Check that the global modules directory exists and is recognized.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Environment`] otherwise.
    pub fn validate(&self) -> Result<(), LinkError> {
        let dir = &self.global_modules_dir;
        if !dir.is_dir() {
            return Err(LinkError::Environment(format!(
                "{} does not exist",
                dir.display()
            )));
        }
        if !self.recognized.iter().any(|known| same_path(known, dir)) {
            return Err(LinkError::Environment(format!(
                "{} is not a recognized global modules directory",
                dir.display()
            )));
        }
        Ok(())
    }

    /// `<global modules dir>/<name>`.
    #[must_use]
    pub fn global_path(&self, name: &str) -> PathBuf {
        self.global_modules_dir.join(name)
    }

    /// `<project root>/node_modules/<name>`.
    #[must_use]
    pub fn local_path(&self, name: &str) -> PathBuf {
        self.project_root.join("node_modules").join(name)
    }
}

/// Compare two paths, canonicalizing whichever of them exist.
fn same_path(a: &Path, b: &Path) -> bool {
    let canon = |p: &Path| dunce::canonicalize(p).unwrap_or_else(|_| p.to_path_buf());
    canon(a) == canon(b)
}
