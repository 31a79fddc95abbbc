//! Command: unlink every configured module and reinstall dependencies.
use std::sync::Arc;

use anyhow::Result;

use super::{CommandSetup, Runtime, run_to_completion};
use crate::cli::GlobalOpts;
use crate::logging::{Log, Logger};
use crate::tasks::check_modules;
use crate::tasks::unlink::UnlinkModules;

/// Run the reset command.
///
/// # Errors
///
/// Returns an error if setup fails, any module cannot be unlinked, or
/// `npm install` fails afterwards.
pub fn run(global: &GlobalOpts, log: &Arc<Logger>) -> Result<()> {
    let setup = CommandSetup::init(global, log.as_ref())?;
    check_modules(&setup.config)?;
    let runtime = Runtime::system(global, &setup.project_root, Arc::clone(log) as Arc<dyn Log>)?;
    run_to_completion(&setup, &runtime, &UnlinkModules, log)?;
    Ok(())
}
