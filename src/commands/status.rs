//! Command: show the link state of every configured module.
use std::sync::Arc;

use anyhow::Result;

use super::{CommandSetup, resolve_environment};
use crate::cli::GlobalOpts;
use crate::config::Config;
use crate::environment::Environment;
use crate::exec::SystemExecutor;
use crate::logging::Log;
use crate::npm::Npm;
use crate::resources::LinkState;
use crate::resources::module_link::inspect;
use crate::resources::source::SourcePlan;

/// Link state of one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleLinkStatus {
    /// Module name.
    pub name: String,
    /// What is currently on disk.
    pub state: LinkState,
}

impl ModuleLinkStatus {
    /// One line for the status listing.
    #[must_use]
    pub fn line(&self) -> String {
        match &self.state {
            LinkState::Linked => format!("\x1b[32m✓\x1b[0m {}: linked", self.name),
            LinkState::Unlinked => format!("\x1b[2m·\x1b[0m {}: not linked", self.name),
            LinkState::Partial { detail } => {
                format!("\x1b[33m!\x1b[0m {}: partially linked ({detail})", self.name)
            }
        }
    }
}

/// Inspect every module in `config` without changing anything.
///
/// A module whose source cannot be determined is still inspected; its
/// global entry then only has to be a symlink to count as linked.
#[must_use]
pub fn collect(config: &Config, env: &Environment) -> Vec<ModuleLinkStatus> {
    config
        .modules
        .iter()
        .map(|module| {
            let plan = SourcePlan::for_module(
                &module.name,
                &module.spec,
                config.base_modules_path.as_deref(),
            )
            .ok();
            let state = inspect(
                &env.global_path(&module.name),
                &env.local_path(&module.name),
                plan.as_ref().map(SourcePlan::checkout_path),
            );
            ModuleLinkStatus {
                name: module.name.clone(),
                state,
            }
        })
        .collect()
}

/// Run the status command.
///
/// # Errors
///
/// Returns an error if setup fails or the npm prefix cannot be determined.
pub fn run(global: &GlobalOpts, log: &dyn Log) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let npm = Npm::new(Arc::new(SystemExecutor));
    let env = resolve_environment(global, &setup.project_root, &npm)?;
    if let Err(e) = env.validate() {
        log.warn(&e.to_string());
    }

    log.stage("Module status");
    for status in collect(&setup.config, &env) {
        log.info(&status.line());
    }
    Ok(())
}
