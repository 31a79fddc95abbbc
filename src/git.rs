//! Repository cloning through the `git` client.
use std::path::Path;
use std::sync::Arc;

use crate::error::LinkError;
use crate::exec::Executor;
use crate::resources::helpers::fs::ensure_parent_dir;

/// Clones a repository URL into a destination directory.
#[cfg_attr(test, mockall::automock)]
pub trait CloneService: Send + Sync {
    /// Clone `url` into `dest`. `dest` must be absent or an empty directory.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Clone`] if the clone does not complete.
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), LinkError>;
}

/// Production [`CloneService`] that shells out to `git clone`.
#[derive(Debug)]
pub struct GitCloner {
    executor: Arc<dyn Executor>,
}

impl GitCloner {
    /// Create a cloner that runs `git` through `executor`.
    #[must_use]
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self { executor }
    }
}

impl CloneService for GitCloner {
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), LinkError> {
        let fail = |reason: String| LinkError::Clone {
            url: url.to_string(),
            dest: dest.to_path_buf(),
            reason,
        };

        if !self.executor.which("git") {
            return Err(fail("git not found on PATH".to_string()));
        }
        ensure_parent_dir(dest)?;

        let dest_str = dest.to_string_lossy();
        self.executor
            .run("git", &["clone", url, &dest_str])
            .map_err(|e| fail(format!("{e:#}")))?;
        Ok(())
    }
}
