//! Master step - loudness/dynamics normalization of the input.

use crate::assembly::BodySegment;
use crate::mastering::Normalizer;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, StepOutcome};

/// Produces the body segment. In bumper-only mode the input itself is
/// the body and this step is skipped.
pub struct MasterStep;

impl MasterStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MasterStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for MasterStep {
    fn name(&self) -> &str {
        "Master"
    }

    fn validate_input(&self, _ctx: &Context) -> StepResult<()> {
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        if !ctx.run.flags.mode.masters() {
            state.body = Some(BodySegment::caller(&ctx.job.input));
            return Ok(StepOutcome::Skipped("input is already mastered".to_string()));
        }

        let normalizer = Normalizer::new(
            ctx.run.profile.clone(),
            ctx.run.canonical.clone(),
            ctx.transcoder.clone(),
        );
        let dest = ctx.scratch.path_for(&normalizer.intermediate_name());
        let mastered = normalizer.master(&ctx.job.input, &dest, &ctx.effects)?;

        state.body = Some(BodySegment::mastered(mastered));
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, ctx: &Context, state: &JobState) -> StepResult<()> {
        match state.body {
            Some(ref body) if ctx.effects.exists(&body.path) => Ok(()),
            Some(ref body) => Err(StepError::invalid_output(format!(
                "Mastered file missing: {}",
                body.path.display()
            ))),
            None => Err(StepError::invalid_output("Body not recorded")),
        }
    }
}
