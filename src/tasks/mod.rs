//! Ordered traversal of the configured modules.
//!
//! [`traverse`] walks the module list in declaration order and applies one
//! [`Strategy`] to each module, strictly one at a time. The first error
//! halts the run; modules already processed keep their new state.
mod context;
pub mod link;
pub mod unlink;

pub use context::Context;

use std::path::{Path, PathBuf};

use crate::config::validation::name_path_problem;
use crate::config::{Config, ModuleSpec};
use crate::environment::Environment;
use crate::error::LinkError;
use crate::logging::ModuleStatus;
use crate::resources::LinkChange;

/// One module as handed to a [`Strategy`].
#[derive(Debug, Clone)]
pub struct ModuleTarget<'a> {
    /// Module name.
    pub name: &'a str,
    /// Declared source.
    pub spec: &'a ModuleSpec,
    /// Directory url-only modules are cloned under.
    pub base_modules_path: Option<&'a Path>,
    /// `<global modules dir>/<name>`.
    pub global_path: PathBuf,
    /// `<project root>/node_modules/<name>`.
    pub local_path: PathBuf,
}

/// The per-module operation applied by [`traverse`].
pub trait Strategy: Send + Sync {
    /// Human-readable strategy name.
    fn name(&self) -> &str;

    /// Present participle used in per-module stage headers ("Linking").
    fn verb(&self) -> &str;

    /// Apply the strategy to one module.
    ///
    /// # Errors
    ///
    /// Any error halts the traversal.
    fn apply(
        &self,
        ctx: &Context,
        env: &Environment,
        target: &ModuleTarget<'_>,
    ) -> Result<LinkChange, LinkError>;

    /// Run once after every module succeeded.
    ///
    /// # Errors
    ///
    /// Returns an error if the completion step fails.
    fn finish(&self, ctx: &Context, env: &Environment) -> Result<(), LinkError>;
}

/// What happened to one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleOutcome {
    /// Module name.
    pub name: String,
    /// The change made.
    pub change: LinkChange,
}

/// Outcomes of a completed traversal, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraversalReport {
    /// One entry per module.
    pub outcomes: Vec<ModuleOutcome>,
}

impl TraversalReport {
    /// Number of modules that were changed.
    #[must_use]
    pub fn changed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.change == LinkChange::Applied)
            .count()
    }
}

/// Check that `config` can be traversed at all.
///
/// # Errors
///
/// Returns [`LinkError::Configuration`] if no modules are declared or a
/// module name would resolve outside `node_modules`.
pub fn check_modules(config: &Config) -> Result<(), LinkError> {
    if config.modules.is_empty() {
        return Err(LinkError::Configuration(
            "no modules declared in config".to_string(),
        ));
    }
    for module in &config.modules {
        if let Some(problem) = name_path_problem(&module.name) {
            return Err(LinkError::Configuration(format!(
                "invalid module name {:?}: {problem}",
                module.name
            )));
        }
    }
    Ok(())
}

/// Apply `strategy` to every module in `config`, in declaration order.
///
/// # Errors
///
/// - [`LinkError::Configuration`] from [`check_modules`] (checked before
///   anything is touched)
/// - [`LinkError::Environment`] if the global modules directory is invalid
/// - the first error returned by the strategy or its completion step
pub fn traverse(
    config: &Config,
    env: &Environment,
    strategy: &dyn Strategy,
    ctx: &Context,
) -> Result<TraversalReport, LinkError> {
    check_modules(config)?;
    env.validate()?;
    ctx.log.debug(&format!(
        "{}: {} module(s), global modules at {}",
        strategy.name(),
        config.modules.len(),
        env.global_modules_dir.display()
    ));

    let mut report = TraversalReport::default();
    for module in &config.modules {
        ctx.log.stage(&format!("{} {}", strategy.verb(), module.name));
        let target = ModuleTarget {
            name: &module.name,
            spec: &module.spec,
            base_modules_path: config.base_modules_path.as_deref(),
            global_path: env.global_path(&module.name),
            local_path: env.local_path(&module.name),
        };

        match strategy.apply(ctx, env, &target) {
            Ok(change) => {
                let status = match (&change, ctx.dry_run) {
                    (LinkChange::AlreadyCorrect, _) => ModuleStatus::AlreadyOk,
                    (LinkChange::Applied, true) => ModuleStatus::DryRun,
                    (LinkChange::Applied, false) => ModuleStatus::Ok,
                };
                ctx.log.record_module(&module.name, status, None);
                report.outcomes.push(ModuleOutcome {
                    name: module.name.clone(),
                    change,
                });
            }
            Err(e) => {
                ctx.log.error(&format!("{}: {e}", module.name));
                ctx.log
                    .record_module(&module.name, ModuleStatus::Failed, Some(&e.to_string()));
                return Err(e);
            }
        }
    }

    strategy.finish(ctx, env)?;
    Ok(report)
}

/// Shared fakes and fixtures for task and resource unit tests.
#[cfg(test)]
pub mod test_helpers {
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    use super::Context;
    use crate::environment::Environment;
    use crate::error::LinkError;
    use crate::git::{CloneService, MockCloneService};
    use crate::logging::{Log, Logger};
    use crate::npm::PackageManager;
    use crate::privileged::{PrivilegedCommand, PrivilegedExecutor};
    use crate::resources::helpers::fs::{create_symlink, remove_any};

    /// Privileged executor that performs the equivalent filesystem
    /// operations directly.
    ///
    /// `npm link <source>` is modelled as creating
    /// `<global dir>/<source dir name> -> source` plus the project entry
    /// pointing at it, so a checkout whose directory name differs from the
    /// module name reproduces a package name mismatch.
    #[derive(Debug)]
    pub struct FakePrivileged {
        global_dir: Option<PathBuf>,
        calls: Mutex<Vec<PrivilegedCommand>>,
        fail_next: AtomicBool,
    }

    impl FakePrivileged {
        /// A fake operating on `global_dir`.
        #[must_use]
        pub const fn new(global_dir: PathBuf) -> Self {
            Self {
                global_dir: Some(global_dir),
                calls: Mutex::new(Vec::new()),
                fail_next: AtomicBool::new(false),
            }
        }

        /// A fake that rejects every command.
        #[must_use]
        pub const fn unreachable() -> Self {
            Self {
                global_dir: None,
                calls: Mutex::new(Vec::new()),
                fail_next: AtomicBool::new(false),
            }
        }

        /// Make the next command fail as if sudo were denied.
        pub fn fail_next(&self) {
            self.fail_next.store(true, Ordering::SeqCst);
        }

        /// Every command received so far.
        #[must_use]
        pub fn calls(&self) -> Vec<PrivilegedCommand> {
            self.calls.lock().map_or_else(|_| vec![], |g| g.clone())
        }

        fn deny(command: &PrivilegedCommand, reason: &str) -> LinkError {
            let (program, args) = command.argv();
            LinkError::Privilege {
                command: format!("{program} {}", args.join(" ")),
                reason: reason.to_string(),
            }
        }
    }

    impl PrivilegedExecutor for FakePrivileged {
        fn execute(&self, command: &PrivilegedCommand) -> Result<(), LinkError> {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(command.clone());
            }
            if self.fail_next.swap(false, Ordering::SeqCst) {
                return Err(Self::deny(command, "exit 1"));
            }
            let Some(global_dir) = &self.global_dir else {
                return Err(Self::deny(command, "unexpected privileged command"));
            };
            match command {
                PrivilegedCommand::NpmLink {
                    source,
                    project_root,
                } => {
                    let Some(package) = source.file_name() else {
                        return Err(Self::deny(command, "source has no name"));
                    };
                    let global = global_dir.join(package);
                    remove_any(&global)?;
                    create_symlink(source, &global)?;
                    let local = project_root.join("node_modules").join(package);
                    remove_any(&local)?;
                    create_symlink(&global, &local)
                }
                PrivilegedCommand::RemoveAll { path } => remove_any(path),
            }
        }
    }

    /// Package manager that records installs instead of running npm.
    #[derive(Debug, Default)]
    pub struct FakePackageManager {
        installs: Mutex<Vec<PathBuf>>,
        fail: bool,
    }

    impl FakePackageManager {
        /// A package manager whose installs always fail.
        #[must_use]
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        /// Project roots `install` was called with.
        #[must_use]
        pub fn installs(&self) -> Vec<PathBuf> {
            self.installs.lock().map_or_else(|_| vec![], |g| g.clone())
        }
    }

    impl PackageManager for FakePackageManager {
        fn global_prefix(&self) -> Result<PathBuf, LinkError> {
            Err(LinkError::Environment("no prefix in tests".to_string()))
        }

        fn install(&self, project_root: &Path) -> Result<(), LinkError> {
            if let Ok(mut installs) = self.installs.lock() {
                installs.push(project_root.to_path_buf());
            }
            if self.fail {
                return Err(LinkError::Reinstall("npm install failed".to_string()));
            }
            Ok(())
        }
    }

    /// A scratch global modules directory, project and source tree.
    #[derive(Debug)]
    pub struct Sandbox {
        _tmp: tempfile::TempDir,
        /// `<tmp>/prefix/lib/node_modules`.
        pub global_dir: PathBuf,
        /// `<tmp>/project`.
        pub project: PathBuf,
        /// `<tmp>/src`, parent of every source checkout.
        pub sources: PathBuf,
        /// The privileged fake bound to `global_dir`.
        pub privileged: Arc<FakePrivileged>,
        /// The package manager fake.
        pub package_manager: Arc<FakePackageManager>,
    }

    impl Sandbox {
        /// Create the directory layout.
        #[must_use]
        #[allow(clippy::expect_used)]
        pub fn new() -> Self {
            let tmp = tempfile::tempdir().expect("tempdir");
            let root = dunce::canonicalize(tmp.path()).expect("canonical tempdir");
            let global_dir = root.join("prefix").join("lib").join("node_modules");
            let project = root.join("project");
            let sources = root.join("src");
            for dir in [&global_dir, &project, &sources] {
                std::fs::create_dir_all(dir).expect("create sandbox dir");
            }
            std::fs::write(project.join("package.json"), "{}").expect("write package.json");
            Self {
                _tmp: tmp,
                privileged: Arc::new(FakePrivileged::new(global_dir.clone())),
                package_manager: Arc::new(FakePackageManager::default()),
                global_dir,
                project,
                sources,
            }
        }

        /// Path of source checkout `name`, created with a `package.json`.
        #[must_use]
        #[allow(clippy::expect_used)]
        pub fn source(&self, name: &str) -> PathBuf {
            let dir = self.sources.join(name);
            std::fs::create_dir_all(&dir).expect("create source");
            std::fs::write(dir.join("package.json"), format!("{{\"name\":\"{name}\"}}"))
                .expect("write package.json");
            dir
        }

        /// Environment rooted in the sandbox, recognizing its global dir.
        #[must_use]
        pub fn env(&self) -> Environment {
            Environment {
                global_modules_dir: self.global_dir.clone(),
                project_root: self.project.clone(),
                recognized: vec![self.global_dir.clone()],
            }
        }
    }

    /// Builder for a test [`Context`].
    pub struct ContextBuilder {
        log: Arc<dyn Log>,
        dry_run: bool,
        privileged: Arc<dyn PrivilegedExecutor>,
        cloner: Arc<dyn CloneService>,
        package_manager: Arc<dyn PackageManager>,
    }

    impl std::fmt::Debug for ContextBuilder {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("ContextBuilder")
                .field("dry_run", &self.dry_run)
                .finish_non_exhaustive()
        }
    }

    impl Default for ContextBuilder {
        fn default() -> Self {
            Self::new()
        }
    }

    impl ContextBuilder {
        /// Defaults: no log file, no dry run, and collaborators that
        /// reject every call.
        #[must_use]
        pub fn new() -> Self {
            Self {
                log: Arc::new(Logger::with_log_file(None)),
                dry_run: false,
                privileged: Arc::new(FakePrivileged::unreachable()),
                cloner: Arc::new(MockCloneService::new()),
                package_manager: Arc::new(FakePackageManager::failing()),
            }
        }

        /// Use the sandbox's privileged and package-manager fakes.
        #[must_use]
        pub fn sandbox(mut self, sandbox: &Sandbox) -> Self {
            self.privileged = Arc::clone(&sandbox.privileged) as Arc<dyn PrivilegedExecutor>;
            self.package_manager =
                Arc::clone(&sandbox.package_manager) as Arc<dyn PackageManager>;
            self
        }

        /// Use `cloner` for clone requests.
        #[must_use]
        pub fn cloner(mut self, cloner: MockCloneService) -> Self {
            self.cloner = Arc::new(cloner);
            self
        }

        /// Log through `log`.
        #[must_use]
        pub fn log(mut self, log: Arc<dyn Log>) -> Self {
            self.log = log;
            self
        }

        /// Set the dry-run flag.
        #[must_use]
        pub fn dry_run(mut self, dry_run: bool) -> Self {
            self.dry_run = dry_run;
            self
        }

        /// Build the context.
        #[must_use]
        pub fn build(self) -> Context {
            Context::new(
                self.log,
                self.dry_run,
                self.privileged,
                self.cloner,
                self.package_manager,
            )
        }
    }
}
