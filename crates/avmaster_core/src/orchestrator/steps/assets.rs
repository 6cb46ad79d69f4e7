//! Assets step - makes sure every planned bumper asset is available.

use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, StepOutcome};
use crate::planner::AssetSource;

/// Locates head/tail and provisions silence before any mastering work,
/// so a missing ident fails the job early.
pub struct AssetsStep;

impl AssetsStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AssetsStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for AssetsStep {
    fn name(&self) -> &str {
        "Assets"
    }

    fn description(&self) -> &str {
        "Locate bumper assets"
    }

    fn validate_input(&self, _ctx: &Context) -> StepResult<()> {
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        let plan = state
            .plan
            .as_ref()
            .ok_or_else(|| StepError::invalid_input("No plan available"))?;

        let assets = plan.assets();
        if assets.is_empty() {
            return Ok(StepOutcome::Skipped("no bumper segments".to_string()));
        }

        for asset in assets {
            let override_path = match asset.source {
                AssetSource::Override => Some(asset.path.as_path()),
                AssetSource::Default => None,
            };
            let path = ctx
                .provisioner
                .locate(asset.role, override_path, &ctx.effects)?;
            ctx.logger
                .info(&format!("{}: {}", asset.role, path.display()));
            state.assets.insert(asset.role, path);
        }

        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, ctx: &Context, state: &JobState) -> StepResult<()> {
        for (role, path) in &state.assets {
            if !ctx.effects.exists(path) {
                return Err(StepError::missing_asset(*role, path));
            }
        }
        Ok(())
    }
}
