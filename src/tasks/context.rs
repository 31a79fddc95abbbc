use std::sync::Arc;

use crate::git::CloneService;
use crate::logging::Log;
use crate::npm::PackageManager;
use crate::privileged::PrivilegedExecutor;

/// Collaborators shared by every step of a run.
pub struct Context {
    /// Logger for output and per-module recording.
    pub log: Arc<dyn Log>,
    /// Whether to perform a dry run (preview changes without applying).
    pub dry_run: bool,
    /// Runs `npm link` and `rm -rf` with elevated rights.
    pub privileged: Arc<dyn PrivilegedExecutor>,
    /// Clones url-backed modules.
    pub cloner: Arc<dyn CloneService>,
    /// Queries npm and reinstalls dependencies after an unlink.
    pub package_manager: Arc<dyn PackageManager>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("log", &"<dyn Log>")
            .field("dry_run", &self.dry_run)
            .field("privileged", &self.privileged)
            .field("cloner", &"<dyn CloneService>")
            .field("package_manager", &self.package_manager)
            .finish()
    }
}

impl Context {
    /// Create a context from its collaborators.
    #[must_use]
    pub fn new(
        log: Arc<dyn Log>,
        dry_run: bool,
        privileged: Arc<dyn PrivilegedExecutor>,
        cloner: Arc<dyn CloneService>,
        package_manager: Arc<dyn PackageManager>,
    ) -> Self {
        Self {
            log,
            dry_run,
            privileged,
            cloner,
            package_manager,
        }
    }
}
