//! Command: link every configured module.
use std::sync::Arc;

use anyhow::Result;

use super::{CommandSetup, Runtime, run_to_completion};
use crate::cli::GlobalOpts;
use crate::logging::{Log, Logger};
use crate::tasks::check_modules;
use crate::tasks::link::LinkModules;

/// Run the start command.
///
/// # Errors
///
/// Returns an error if setup fails or any module cannot be linked.
pub fn run(global: &GlobalOpts, log: &Arc<Logger>) -> Result<()> {
    let setup = CommandSetup::init(global, log.as_ref())?;
    check_modules(&setup.config)?;
    let runtime = Runtime::system(global, &setup.project_root, Arc::clone(log) as Arc<dyn Log>)?;
    run_to_completion(&setup, &runtime, &LinkModules, log)?;
    Ok(())
}
