//! Top-level subcommand orchestration.
pub mod init;
pub mod reset;
pub mod start;
pub mod status;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::config::Config;
use crate::config::loader::{self, CONFIG_FILE_NAME};
use crate::config::validation;
use crate::environment::{Environment, GlobalPathSources};
use crate::exec::{Executor, SystemExecutor};
use crate::git::GitCloner;
use crate::logging::{Log, Logger};
use crate::npm::{Npm, PackageManager};
use crate::privileged::{Elevation, SudoExecutor};
use crate::tasks::{self, Context, Strategy, TraversalReport};

/// Version string reported by `mdlink version` and logged at startup.
#[must_use]
pub const fn version() -> &'static str {
    match option_env!("MDLINK_VERSION") {
        Some(version) => version,
        None => env!("CARGO_PKG_VERSION"),
    }
}

/// Shared state produced by the common command setup sequence.
///
/// Resolves the project root, finds the config file and loads it, so
/// that each command does not have to repeat the boilerplate.
#[derive(Debug)]
pub struct CommandSetup {
    /// Canonical project root.
    pub project_root: PathBuf,
    /// The config file that was loaded.
    pub config_path: PathBuf,
    /// The loaded configuration.
    pub config: Config,
}

impl CommandSetup {
    /// Resolve the project root and load its configuration.
    ///
    /// Validation warnings are logged but never fatal.
    ///
    /// # Errors
    ///
    /// Returns an error if the project root does not exist or the config
    /// file cannot be read or parsed.
    pub fn init(global: &GlobalOpts, log: &dyn Log) -> Result<Self> {
        let project_root = resolve_project_root(global)?;
        let config_path = config_path(global, &project_root);
        let home = std::env::var_os("HOME").map(PathBuf::from);

        log.stage("Loading configuration");
        let config = loader::load(&config_path, &project_root, home.as_deref())?;
        log.info(&format!(
            "loaded {} module(s) from {}",
            config.modules.len(),
            config_path.display()
        ));
        if let Some(base) = &config.base_modules_path {
            log.debug(&format!("base modules path: {}", base.display()));
        }

        let source = config_path
            .file_name()
            .map_or_else(|| CONFIG_FILE_NAME.to_string(), |n| n.to_string_lossy().into_owned());
        let warnings = validation::validate(&config, &source);
        if !warnings.is_empty() {
            log.warn(&format!(
                "found {} configuration warning(s):",
                warnings.len()
            ));
            for warning in &warnings {
                log.warn(&format!(
                    "  {} [{}]: {}",
                    warning.source, warning.item, warning.message
                ));
            }
        }

        Ok(Self {
            project_root,
            config_path,
            config,
        })
    }
}

/// The environment and collaborators a linking command runs against.
#[derive(Debug)]
pub struct Runtime {
    /// Directories the run operates on.
    pub env: Environment,
    /// Collaborators shared by every module.
    pub ctx: Context,
}

impl Runtime {
    /// Wire the production collaborators: `sudo`, `git` and `npm`.
    ///
    /// # Errors
    ///
    /// Returns an error if no `--prefix` was given and npm cannot report
    /// its global prefix.
    pub fn system(global: &GlobalOpts, project_root: &Path, log: Arc<dyn Log>) -> Result<Self> {
        let executor: Arc<dyn Executor> = Arc::new(SystemExecutor);
        let npm = Arc::new(Npm::new(Arc::clone(&executor)));
        let env = resolve_environment(global, project_root, npm.as_ref())?;

        let elevation = Elevation::detect(executor.as_ref(), !global.no_sudo);
        log.debug(&format!("privileged commands: {elevation:?}"));

        let ctx = Context::new(
            log,
            global.dry_run,
            Arc::new(SudoExecutor::new(Arc::clone(&executor), elevation)),
            Arc::new(GitCloner::new(Arc::clone(&executor))),
            npm,
        );
        Ok(Self { env, ctx })
    }
}

/// Project root from `--project`, or the current directory.
///
/// # Errors
///
/// Returns an error if the directory cannot be determined or does not
/// exist.
pub fn resolve_project_root(global: &GlobalOpts) -> Result<PathBuf> {
    let root = match &global.project {
        Some(project) => project.clone(),
        None => std::env::current_dir().context("cannot determine current directory")?,
    };
    dunce::canonicalize(&root)
        .with_context(|| format!("project root {} not found", root.display()))
}

/// Config file from `--config`, or `mdlink.config.json` in the project root.
#[must_use]
pub fn config_path(global: &GlobalOpts, project_root: &Path) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(|| project_root.join(CONFIG_FILE_NAME))
}

/// Build the [`Environment`] for `project_root`, asking `npm` for the
/// global prefix unless `--prefix` was given.
///
/// # Errors
///
/// Returns an error if the prefix cannot be determined.
pub fn resolve_environment(
    global: &GlobalOpts,
    project_root: &Path,
    npm: &dyn PackageManager,
) -> Result<Environment> {
    let prefix = match &global.prefix {
        Some(prefix) => prefix.clone(),
        None => npm.global_prefix()?,
    };
    Ok(Environment::new(
        &prefix,
        project_root.to_path_buf(),
        &GlobalPathSources::from_env(),
    ))
}

/// Traverse the configured modules with `strategy`, then print the summary.
///
/// # Errors
///
/// Returns the error that halted the traversal.
pub fn run_to_completion(
    setup: &CommandSetup,
    runtime: &Runtime,
    strategy: &dyn Strategy,
    log: &Logger,
) -> Result<TraversalReport> {
    log.debug(&format!("mdlink {}", version()));
    let result = tasks::traverse(&setup.config, &runtime.env, strategy, &runtime.ctx);
    log.print_summary();
    result.with_context(|| format!("{} did not complete", strategy.name()))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser as _;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["mdlink"];
        argv.extend_from_slice(args);
        argv.push("status");
        Cli::parse_from(argv).global
    }

    #[test]
    fn config_path_defaults_to_project_file() {
        let path = config_path(&global(&[]), Path::new("/work/app"));
        assert_eq!(path, PathBuf::from("/work/app/mdlink.config.json"));
    }

    #[test]
    fn config_path_override_wins() {
        let path = config_path(&global(&["--config", "/etc/alt.json"]), Path::new("/work/app"));
        assert_eq!(path, PathBuf::from("/etc/alt.json"));
    }

    #[test]
    fn project_root_is_canonicalized() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("app");
        std::fs::create_dir(&dir).unwrap();
        let arg = tmp.path().join("app").join("..").join("app");

        let root = resolve_project_root(&global(&["--project", arg.to_str().unwrap()])).unwrap();

        assert_eq!(root, dunce::canonicalize(&dir).unwrap());
    }

    #[test]
    fn missing_project_root_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("nope");
        assert!(resolve_project_root(&global(&["--project", missing.to_str().unwrap()])).is_err());
    }

    #[test]
    fn setup_loads_project_config() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("src").join("a");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(
            tmp.path().join(CONFIG_FILE_NAME),
            r#"{"modules": {"a": {"path": "src/a"}, "Bad Name": {"path": "src/a"}}}"#,
        )
        .unwrap();
        let log = Logger::with_log_file(None);

        let setup = CommandSetup::init(
            &global(&["--project", tmp.path().to_str().unwrap()]),
            &log,
        )
        .unwrap();

        assert_eq!(setup.config.modules.len(), 2);
        assert_eq!(setup.config.modules[0].name, "a");
        assert_eq!(
            setup.config.modules[0].spec.path.as_deref(),
            Some(setup.project_root.join("src/a").as_path())
        );
        assert_eq!(setup.config_path, setup.project_root.join(CONFIG_FILE_NAME));
    }

    #[test]
    fn setup_without_config_file_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        let log = Logger::with_log_file(None);
        let err = CommandSetup::init(&global(&["--project", tmp.path().to_str().unwrap()]), &log)
            .unwrap_err();
        assert!(err.to_string().contains(CONFIG_FILE_NAME));
    }

    #[test]
    fn prefix_override_skips_npm() {
        let tmp = tempfile::tempdir().unwrap();
        let npm = crate::npm::Npm::new(Arc::new(
            crate::exec::test_helpers::MockExecutor::with_responses(vec![]),
        ));

        let env = resolve_environment(
            &global(&["--prefix", "/opt/node"]),
            tmp.path(),
            &npm,
        )
        .unwrap();

        assert_eq!(env.global_modules_dir, PathBuf::from("/opt/node/lib/node_modules"));
        assert_eq!(env.project_root, tmp.path());
    }
}
