//! The unlink strategy: tear down each chain, then reinstall.
use super::{Context, ModuleTarget, Strategy};
use crate::environment::Environment;
use crate::error::LinkError;
use crate::resources::LinkChange;
use crate::resources::module_link::LinkManager;

/// Remove every module's chain and restore installed copies with
/// `npm install`.
#[derive(Debug, Clone, Copy)]
pub struct UnlinkModules;

impl Strategy for UnlinkModules {
    fn name(&self) -> &'static str {
        "unlink"
    }

    fn verb(&self) -> &'static str {
        "Unlinking"
    }

    fn apply(
        &self,
        ctx: &Context,
        env: &Environment,
        target: &ModuleTarget<'_>,
    ) -> Result<LinkChange, LinkError> {
        LinkManager::new(ctx, &env.project_root).remove(
            target.name,
            &target.global_path,
            &target.local_path,
        )
    }

    fn finish(&self, ctx: &Context, env: &Environment) -> Result<(), LinkError> {
        if ctx.dry_run {
            ctx.log.dry_run(&format!(
                "would run: npm install in {}",
                env.project_root.display()
            ));
            return Ok(());
        }
        ctx.log.stage("Reinstalling dependencies");
        ctx.package_manager.install(&env.project_root)?;
        ctx.log.info("Modules successfully unlinked");
        Ok(())
    }
}
