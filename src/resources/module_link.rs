//! The two-hop link chain for one module.
//!
//! ```text
//! <project>/node_modules/<name>  ->  <global modules dir>/<name>  ->  <source checkout>
//! ```
//!
//! The global hop is created and destroyed through the
//! [`PrivilegedExecutor`](crate::privileged::PrivilegedExecutor); the
//! project hop is owned by the invoking user and handled directly.
use std::path::{Path, PathBuf};

use super::helpers::fs::{
    create_symlink, entry_exists, is_symlink, link_target, points_to, remove_any,
};
use super::{LinkChange, LinkState};
use crate::error::LinkError;
use crate::privileged::PrivilegedCommand;
use crate::tasks::Context;

/// Where one module's chain lives, computed fresh per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLocation {
    /// `<global modules dir>/<name>`.
    pub global_module_path: PathBuf,
    /// `<project root>/node_modules/<name>`.
    pub local_module_path: PathBuf,
    /// The source checkout the global entry should point at.
    pub source_checkout_path: PathBuf,
}

/// Creates and removes link chains for a single project.
#[derive(Debug)]
pub struct LinkManager<'a> {
    ctx: &'a Context,
    project_root: &'a Path,
}

impl<'a> LinkManager<'a> {
    /// Create a manager for the project at `project_root`.
    #[must_use]
    pub const fn new(ctx: &'a Context, project_root: &'a Path) -> Self {
        Self { ctx, project_root }
    }

    /// Put `local -> global -> source` in place for module `name`.
    ///
    /// Whatever occupied the project entry before is removed first, then
    /// `npm link <source>` runs with elevated rights. The project entry is
    /// finally forced to be a direct link to the global entry.
    ///
    /// # Errors
    ///
    /// - [`LinkError::Privilege`] if `npm link` fails
    /// - [`LinkError::Link`] if `npm link` succeeded but did not create the
    ///   global entry (the package name differs from `name`)
    /// - [`LinkError::Io`] if the project entry cannot be replaced
    pub fn establish(&self, name: &str, loc: &ResolvedLocation) -> Result<LinkChange, LinkError> {
        let global = &loc.global_module_path;
        let local = &loc.local_module_path;
        let source = &loc.source_checkout_path;

        if inspect(global, local, Some(source)) == LinkState::Linked {
            self.ctx.log.debug(&format!("ok: {name} (already linked)"));
            return Ok(LinkChange::AlreadyCorrect);
        }

        let command = PrivilegedCommand::NpmLink {
            source: source.clone(),
            project_root: self.project_root.to_path_buf(),
        };

        if self.ctx.dry_run {
            if entry_exists(local) {
                self.ctx
                    .log
                    .dry_run(&format!("would remove {}", local.display()));
            }
            self.ctx
                .log
                .dry_run(&format!("would run: npm link {}", source.display()));
            self.ctx.log.dry_run(&format!(
                "would link {} -> {}",
                local.display(),
                global.display()
            ));
            return Ok(LinkChange::Applied);
        }

        remove_any(local)?;
        self.ctx
            .log
            .debug(&format!("npm link {} (privileged)", source.display()));
        self.ctx.privileged.execute(&command)?;

        if !entry_exists(global) {
            return Err(LinkError::Link {
                module: name.to_string(),
                reason: format!(
                    "npm link did not create {}; does the package name in {} match?",
                    global.display(),
                    source.join("package.json").display()
                ),
            });
        }

        if !points_to(local, global) {
            remove_any(local)?;
            create_symlink(global, local)?;
        }
        self.ctx.log.debug(&format!(
            "linked {} -> {} -> {}",
            local.display(),
            global.display(),
            source.display()
        ));
        Ok(LinkChange::Applied)
    }

    /// Tear down the chain for module `name`.
    ///
    /// The project entry is unlinked only if it is a symlink; a real
    /// directory there is left alone. The global entry is removed
    /// recursively with elevated rights if anything occupies it.
    ///
    /// # Errors
    ///
    /// - [`LinkError::Io`] if the project symlink cannot be removed
    /// - [`LinkError::Privilege`] if the elevated removal fails
    pub fn remove(&self, name: &str, global: &Path, local: &Path) -> Result<LinkChange, LinkError> {
        let mut changed = false;

        if is_symlink(local) {
            if self.ctx.dry_run {
                self.ctx
                    .log
                    .dry_run(&format!("would unlink {}", local.display()));
            } else {
                remove_any(local)?;
            }
            changed = true;
        } else if entry_exists(local) {
            self.ctx.log.debug(&format!(
                "{name}: leaving {} in place (not a symlink)",
                local.display()
            ));
        }

        if entry_exists(global) {
            let command = PrivilegedCommand::RemoveAll {
                path: global.to_path_buf(),
            };
            if self.ctx.dry_run {
                self.ctx
                    .log
                    .dry_run(&format!("would run: rm -rf {}", global.display()));
            } else {
                self.ctx
                    .log
                    .debug(&format!("rm -rf {} (privileged)", global.display()));
                self.ctx.privileged.execute(&command)?;
            }
            changed = true;
        }

        if changed {
            Ok(LinkChange::Applied)
        } else {
            self.ctx.log.debug(&format!("ok: {name} (already unlinked)"));
            Ok(LinkChange::AlreadyCorrect)
        }
    }
}

/// Report the current topology of one module's chain without changing it.
///
/// `source` is the expected checkout; when `None` the global entry only
/// needs to be a symlink.
#[must_use]
pub fn inspect(global: &Path, local: &Path, source: Option<&Path>) -> LinkState {
    let local_linked = points_to(local, global);
    let global_linked = match source {
        Some(source) => points_to(global, source),
        None => is_symlink(global),
    };

    if local_linked && global_linked {
        return LinkState::Linked;
    }
    if !is_symlink(local) && !is_symlink(global) {
        return LinkState::Unlinked;
    }

    let mut problems = Vec::new();
    if !local_linked {
        problems.push(match link_target(local) {
            Some(target) => format!("project entry points to {}", target.display()),
            None if entry_exists(local) => "project entry is not a symlink".to_string(),
            None => "project entry missing".to_string(),
        });
    }
    if !global_linked {
        problems.push(match link_target(global) {
            Some(target) => format!("global entry points to {}", target.display()),
            None if entry_exists(global) => "global entry is not a symlink".to_string(),
            None => "global entry missing".to_string(),
        });
    }
    LinkState::Partial {
        detail: problems.join("; "),
    }
}
