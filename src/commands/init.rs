//! Command: write a skeleton config file.
use anyhow::Result;

use super::{config_path, resolve_project_root};
use crate::cli::GlobalOpts;
use crate::config::loader;
use crate::logging::Log;

/// Run the init command.
///
/// # Errors
///
/// Returns an error if the project root does not exist, the config file
/// already exists, or it cannot be written.
pub fn run(global: &GlobalOpts, log: &dyn Log) -> Result<()> {
    let root = resolve_project_root(global)?;
    let path = config_path(global, &root);

    log.stage("Writing config skeleton");
    if global.dry_run {
        log.dry_run(&format!("would write {}", path.display()));
        return Ok(());
    }
    loader::write_skeleton(&path)?;
    log.info(&format!("wrote {}", path.display()));
    Ok(())
}
