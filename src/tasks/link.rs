//! The link strategy: resolve each module's source, then build its chain.
use super::{Context, ModuleTarget, Strategy};
use crate::environment::Environment;
use crate::error::LinkError;
use crate::resources::LinkChange;
use crate::resources::module_link::{LinkManager, ResolvedLocation};
use crate::resources::source::SourceResolver;

/// Link every module into the project through the global modules directory.
#[derive(Debug, Clone, Copy)]
pub struct LinkModules;

impl Strategy for LinkModules {
    fn name(&self) -> &'static str {
        "link"
    }

    fn verb(&self) -> &'static str {
        "Linking"
    }

    fn apply(
        &self,
        ctx: &Context,
        env: &Environment,
        target: &ModuleTarget<'_>,
    ) -> Result<LinkChange, LinkError> {
        let source =
            SourceResolver::new(ctx).resolve(target.name, target.spec, target.base_modules_path)?;
        let location = ResolvedLocation {
            global_module_path: target.global_path.clone(),
            local_module_path: target.local_path.clone(),
            source_checkout_path: source,
        };
        LinkManager::new(ctx, &env.project_root).establish(target.name, &location)
    }

    fn finish(&self, ctx: &Context, _env: &Environment) -> Result<(), LinkError> {
        if ctx.dry_run {
            ctx.log.dry_run("no modules were linked");
        } else {
            ctx.log.info("Properly linked modules");
        }
        Ok(())
    }
}
