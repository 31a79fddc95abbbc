//! Source checkout resolution.
//!
//! A module's source is either an existing directory or a repository to
//! clone. [`SourcePlan::for_module`] decides which without touching the
//! filesystem; [`SourceResolver::resolve`] carries the plan out.
use std::path::{Path, PathBuf};

use super::helpers::fs::{dir_is_empty, entry_exists, is_checkout};
use crate::config::ModuleSpec;
use crate::error::LinkError;
use crate::tasks::Context;

/// How a module's source checkout will be obtained.
///
/// | `path` | `url` | plan                                   |
/// |--------|-------|----------------------------------------|
/// | set    | unset | [`Existing`](Self::Existing)           |
/// | set    | set   | [`CloneInto`](Self::CloneInto)         |
/// | unset  | set   | [`CloneIntoBase`](Self::CloneIntoBase) |
/// | unset  | unset | configuration error                    |
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourcePlan {
    /// Use an existing directory as-is.
    Existing(PathBuf),
    /// Clone into the declared path.
    CloneInto {
        /// Repository URL.
        url: String,
        /// Declared destination.
        dest: PathBuf,
    },
    /// Clone into `<base>/<name>`, creating `base` first.
    CloneIntoBase {
        /// Repository URL.
        url: String,
        /// The configured base modules directory.
        base: PathBuf,
        /// `<base>/<name>`.
        dest: PathBuf,
    },
}

impl SourcePlan {
    /// Choose a plan for module `name`.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Configuration`] if the module declares neither
    /// `path` nor `url`, or only a `url` while `base` is unset.
    pub fn for_module(
        name: &str,
        spec: &ModuleSpec,
        base: Option<&Path>,
    ) -> Result<Self, LinkError> {
        match (&spec.path, &spec.url) {
            (Some(path), None) => Ok(Self::Existing(path.clone())),
            (Some(path), Some(url)) => Ok(Self::CloneInto {
                url: url.clone(),
                dest: path.clone(),
            }),
            (None, Some(url)) => {
                let base = base.ok_or_else(|| {
                    LinkError::Configuration(format!(
                        "module '{name}' has only a url and base_modules_path is not set"
                    ))
                })?;
                Ok(Self::CloneIntoBase {
                    url: url.clone(),
                    base: base.to_path_buf(),
                    dest: base.join(name),
                })
            }
            (None, None) => Err(LinkError::Configuration(format!(
                "module '{name}' must declare a path or a url"
            ))),
        }
    }

    /// Where the checkout will be once the plan has run.
    #[must_use]
    pub fn checkout_path(&self) -> &Path {
        match self {
            Self::Existing(path) => path,
            Self::CloneInto { dest, .. } | Self::CloneIntoBase { dest, .. } => dest,
        }
    }
}

/// Carries out [`SourcePlan`]s, cloning through the context's
/// [`CloneService`](crate::git::CloneService).
#[derive(Debug)]
pub struct SourceResolver<'a> {
    ctx: &'a Context,
}

impl<'a> SourceResolver<'a> {
    /// Create a resolver bound to `ctx`.
    #[must_use]
    pub const fn new(ctx: &'a Context) -> Self {
        Self { ctx }
    }

    /// Produce the source checkout for module `name`.
    ///
    /// # Errors
    ///
    /// - [`LinkError::Configuration`] if no plan applies
    /// - [`LinkError::PathNotFound`] if an existing-path module is missing
    /// - [`LinkError::Clone`] if the clone fails or the destination is occupied
    pub fn resolve(
        &self,
        name: &str,
        spec: &ModuleSpec,
        base: Option<&Path>,
    ) -> Result<PathBuf, LinkError> {
        let plan = SourcePlan::for_module(name, spec, base)?;
        self.execute(name, &plan)?;
        Ok(plan.checkout_path().to_path_buf())
    }

    fn execute(&self, name: &str, plan: &SourcePlan) -> Result<(), LinkError> {
        match plan {
            SourcePlan::Existing(path) => {
                if !path.exists() {
                    return Err(LinkError::PathNotFound {
                        module: name.to_string(),
                        path: path.clone(),
                    });
                }
                self.ctx
                    .log
                    .debug(&format!("{name}: using {}", path.display()));
                Ok(())
            }
            SourcePlan::CloneInto { url, dest } => self.clone_into(url, dest),
            SourcePlan::CloneIntoBase { url, base, dest } => {
                if !base.is_dir() {
                    if self.ctx.dry_run {
                        self.ctx
                            .log
                            .dry_run(&format!("would create {}", base.display()));
                    } else {
                        std::fs::create_dir_all(base).map_err(|e| LinkError::io(base, e))?;
                    }
                }
                self.clone_into(url, dest)
            }
        }
    }

    fn clone_into(&self, url: &str, dest: &Path) -> Result<(), LinkError> {
        if dest.is_dir() && is_checkout(dest) {
            self.ctx.log.debug(&format!(
                "reusing existing checkout at {}",
                dest.display()
            ));
            return Ok(());
        }
        if entry_exists(dest) && !(dest.is_dir() && dir_is_empty(dest)) {
            return Err(LinkError::Clone {
                url: url.to_string(),
                dest: dest.to_path_buf(),
                reason: "destination exists and is not an empty directory".to_string(),
            });
        }
        if self.ctx.dry_run {
            self.ctx
                .log
                .dry_run(&format!("would clone {url} into {}", dest.display()));
            return Ok(());
        }

        self.ctx
            .log
            .info(&format!("cloning {url} into {}", dest.display()));
        self.ctx.cloner.clone_repo(url, dest)?;
        if !dest.is_dir() {
            return Err(LinkError::Clone {
                url: url.to_string(),
                dest: dest.to_path_buf(),
                reason: "clone reported success but the destination is missing".to_string(),
            });
        }
        Ok(())
    }
}
