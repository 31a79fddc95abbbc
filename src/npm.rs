//! The npm package manager, as seen by mdlink.
//!
//! mdlink only asks npm two things outside the privileged link step: where
//! its global prefix is, and to reinstall a project's declared dependencies
//! once the links are gone.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::LinkError;
use crate::exec::Executor;

/// Package-manager operations used around the linking run.
pub trait PackageManager: Send + Sync + std::fmt::Debug {
    /// The configured global installation prefix (e.g. `/usr`).
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Environment`] if the prefix cannot be queried.
    fn global_prefix(&self) -> Result<PathBuf, LinkError>;

    /// Reinstall the dependencies declared by the project at `project_root`.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Reinstall`] if the install fails.
    fn install(&self, project_root: &Path) -> Result<(), LinkError>;
}

/// Production [`PackageManager`] that shells out to `npm`.
#[derive(Debug)]
pub struct Npm {
    executor: Arc<dyn Executor>,
}

impl Npm {
    /// Create an npm adapter that runs commands through `executor`.
    #[must_use]
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self { executor }
    }
}

impl PackageManager for Npm {
    fn global_prefix(&self) -> Result<PathBuf, LinkError> {
        let result = self
            .executor
            .run("npm", &["config", "get", "prefix"])
            .map_err(|e| LinkError::Environment(format!("cannot query npm prefix: {e:#}")))?;
        let prefix = result.stdout.trim();
        if prefix.is_empty() {
            return Err(LinkError::Environment(
                "npm reported an empty global prefix".to_string(),
            ));
        }
        Ok(PathBuf::from(prefix))
    }

    fn install(&self, project_root: &Path) -> Result<(), LinkError> {
        self.executor
            .run_in(project_root, "npm", &["install"])
            .map(|_| ())
            .map_err(|e| LinkError::Reinstall(format!("{e:#}")))
    }
}

/// The global modules directory under an npm prefix.
#[must_use]
pub fn global_modules_dir(prefix: &Path) -> PathBuf {
    prefix.join("lib").join("node_modules")
}
