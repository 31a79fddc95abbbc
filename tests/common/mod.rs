// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed project, global modules directory
// and source tree, plus filesystem-backed fakes for the privileged executor,
// the clone service and npm, so each integration test can drive a command
// end to end without sudo, git or a network.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use clap::Parser as _;

use mdlink::cli::{Cli, GlobalOpts};
use mdlink::commands::{CommandSetup, Runtime};
use mdlink::config::loader::CONFIG_FILE_NAME;
use mdlink::environment::Environment;
use mdlink::error::LinkError;
use mdlink::git::CloneService;
use mdlink::logging::{Log, Logger, ModuleStatus};
use mdlink::npm::PackageManager;
use mdlink::privileged::{PrivilegedCommand, PrivilegedExecutor};
use mdlink::resources::helpers::fs::{create_symlink, remove_any};
use mdlink::tasks::Context;

/// A [`Log`] that keeps every line it receives, debug output excluded.
#[derive(Debug, Default)]
pub struct RecordingLog {
    lines: Mutex<Vec<String>>,
}

impl RecordingLog {
    fn push(&self, line: String) {
        self.lines.lock().expect("log lock").push(line);
    }

    /// Every recorded line in order.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().expect("log lock").clone()
    }

    /// Recorded lines with `root` replaced by `<root>`.
    pub fn transcript(&self, root: &Path) -> String {
        let root = root.display().to_string();
        self.lines()
            .iter()
            .map(|line| line.replace(&root, "<root>"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Log for RecordingLog {
    fn stage(&self, msg: &str) {
        self.push(format!("==> {msg}"));
    }

    fn info(&self, msg: &str) {
        self.push(msg.to_string());
    }

    fn debug(&self, _msg: &str) {}

    fn warn(&self, msg: &str) {
        self.push(format!("[warn] {msg}"));
    }

    fn error(&self, msg: &str) {
        self.push(format!("[error] {msg}"));
    }

    fn dry_run(&self, msg: &str) {
        self.push(format!("[dry run] {msg}"));
    }

    fn record_module(&self, name: &str, status: ModuleStatus, _message: Option<&str>) {
        self.push(format!("[module] {name}: {status:?}"));
    }
}

/// Privileged executor that performs `npm link` and `rm -rf` directly.
///
/// `npm link <source>` links `<global>/<source dir name>` to the source and
/// the project entry to that, like npm does for a package named after its
/// directory.
#[derive(Debug)]
pub struct FsPrivileged {
    global_dir: PathBuf,
    calls: Mutex<Vec<PrivilegedCommand>>,
    deny_npm_link: bool,
}

impl FsPrivileged {
    pub fn new(global_dir: PathBuf) -> Self {
        Self {
            global_dir,
            calls: Mutex::new(Vec::new()),
            deny_npm_link: false,
        }
    }

    /// Like [`FsPrivileged::new`] but every `npm link` is refused.
    pub fn denying_npm_link(global_dir: PathBuf) -> Self {
        Self {
            deny_npm_link: true,
            ..Self::new(global_dir)
        }
    }

    pub fn calls(&self) -> Vec<PrivilegedCommand> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl PrivilegedExecutor for FsPrivileged {
    fn execute(&self, command: &PrivilegedCommand) -> Result<(), LinkError> {
        self.calls.lock().expect("calls lock").push(command.clone());
        match command {
            PrivilegedCommand::NpmLink {
                source,
                project_root,
            } => {
                if self.deny_npm_link {
                    return Err(LinkError::Privilege {
                        command: format!("sudo npm link {}", source.display()),
                        reason: "exit 1".to_string(),
                    });
                }
                let package = source.file_name().expect("source dir name");
                let global = self.global_dir.join(package);
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

/// Clone service that materialises a checkout instead of running git.
#[derive(Debug, Default)]
pub struct FakeCloner {
    urls: Mutex<Vec<String>>,
    fail: bool,
}

impl FakeCloner {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().expect("urls lock").clone()
    }
}

impl CloneService for FakeCloner {
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), LinkError> {
        self.urls.lock().expect("urls lock").push(url.to_string());
        if self.fail {
            return Err(LinkError::Clone {
                url: url.to_string(),
                dest: dest.to_path_buf(),
                reason: "repository not found".to_string(),
            });
        }
        std::fs::create_dir_all(dest.join(".git")).expect("create checkout");
        std::fs::write(dest.join("package.json"), "{}").expect("write package.json");
        Ok(())
    }
}

/// Package manager that records `npm install` calls.
#[derive(Debug, Default)]
pub struct FakeNpm {
    installs: Mutex<Vec<PathBuf>>,
}

impl FakeNpm {
    pub fn installs(&self) -> Vec<PathBuf> {
        self.installs.lock().expect("installs lock").clone()
    }
}

impl PackageManager for FakeNpm {
    fn global_prefix(&self) -> Result<PathBuf, LinkError> {
        Err(LinkError::Environment("prefix is fixed in tests".to_string()))
    }

    fn install(&self, project_root: &Path) -> Result<(), LinkError> {
        self.installs
            .lock()
            .expect("installs lock")
            .push(project_root.to_path_buf());
        Ok(())
    }
}

/// An isolated project, global modules directory and source tree backed
/// by a [`tempfile::TempDir`].
pub struct Workspace {
    _tmp: tempfile::TempDir,
    /// Canonical temp root.
    pub root: PathBuf,
    /// `<root>/prefix/lib/node_modules`.
    pub global_dir: PathBuf,
    /// `<root>/project`.
    pub project: PathBuf,
    /// `<root>/src`.
    pub sources: PathBuf,
    pub log: Arc<RecordingLog>,
    pub privileged: Arc<FsPrivileged>,
    pub cloner: Arc<FakeCloner>,
    pub npm: Arc<FakeNpm>,
}

impl Workspace {
    pub fn new() -> Self {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let root = dunce::canonicalize(tmp.path()).expect("canonical temp dir");
        let global_dir = root.join("prefix").join("lib").join("node_modules");
        let project = root.join("project");
        let sources = root.join("src");
        for dir in [&global_dir, &project, &sources] {
            std::fs::create_dir_all(dir).expect("create workspace dir");
        }
        std::fs::write(project.join("package.json"), "{}").expect("write package.json");
        Self {
            _tmp: tmp,
            privileged: Arc::new(FsPrivileged::new(global_dir.clone())),
            cloner: Arc::new(FakeCloner::default()),
            npm: Arc::new(FakeNpm::default()),
            log: Arc::new(RecordingLog::default()),
            root,
            global_dir,
            project,
            sources,
        }
    }

    /// Refuse every `npm link`.
    pub fn denying_npm_link(mut self) -> Self {
        self.privileged = Arc::new(FsPrivileged::denying_npm_link(self.global_dir.clone()));
        self
    }

    /// Replace the clone service.
    pub fn with_cloner(mut self, cloner: FakeCloner) -> Self {
        self.cloner = Arc::new(cloner);
        self
    }

    /// Create source checkout `name` with a `package.json`.
    pub fn source(&self, name: &str) -> PathBuf {
        let dir = self.sources.join(name);
        std::fs::create_dir_all(&dir).expect("create source");
        std::fs::write(dir.join("package.json"), format!("{{\"name\":\"{name}\"}}"))
            .expect("write package.json");
        dir
    }

    /// Write `json` as the project's config file.
    ///
    /// `json!` sorts object keys; use [`Workspace::write_config_str`] when
    /// module order matters.
    pub fn write_config(&self, json: &serde_json::Value) {
        self.write_config_str(&serde_json::to_string_pretty(json).expect("serialize config"));
    }

    /// Write `content` verbatim as the project's config file.
    pub fn write_config_str(&self, content: &str) {
        std::fs::write(self.project.join(CONFIG_FILE_NAME), content).expect("write config");
    }

    /// Global options as parsed for `mdlink [--dry-run] <command>`.
    pub fn global_opts(&self, dry_run: bool) -> GlobalOpts {
        let project = self.project.to_str().expect("utf-8 path").to_string();
        let mut argv = vec!["mdlink".to_string(), "--project".to_string(), project];
        if dry_run {
            argv.push("--dry-run".to_string());
        }
        argv.push("start".to_string());
        Cli::parse_from(argv).global
    }

    /// Load the project's config through the command setup.
    pub fn setup(&self) -> CommandSetup {
        CommandSetup::init(&self.global_opts(false), self.log.as_ref()).expect("command setup")
    }

    /// Environment whose global modules directory is the workspace's.
    pub fn env(&self) -> Environment {
        Environment {
            global_modules_dir: self.global_dir.clone(),
            project_root: self.project.clone(),
            recognized: vec![self.global_dir.clone()],
        }
    }

    /// Runtime wired to the workspace fakes.
    pub fn runtime(&self, dry_run: bool) -> Runtime {
        Runtime {
            env: self.env(),
            ctx: Context::new(
                Arc::clone(&self.log) as Arc<dyn Log>,
                dry_run,
                Arc::clone(&self.privileged) as Arc<dyn PrivilegedExecutor>,
                Arc::clone(&self.cloner) as Arc<dyn CloneService>,
                Arc::clone(&self.npm) as Arc<dyn PackageManager>,
            ),
        }
    }

    /// `<global>/<name>`.
    pub fn global(&self, name: &str) -> PathBuf {
        self.global_dir.join(name)
    }

    /// `<project>/node_modules/<name>`.
    pub fn local(&self, name: &str) -> PathBuf {
        self.project.join("node_modules").join(name)
    }

    /// Transcript of the recording log with the temp root redacted.
    pub fn transcript(&self) -> String {
        self.log.transcript(&self.root)
    }

    /// Forget everything logged so far.
    pub fn clear_log(&self) {
        self.log.lines.lock().expect("log lock").clear();
    }
}

/// A summary logger that writes nowhere.
pub fn quiet_logger() -> Logger {
    Logger::with_log_file(None)
}
