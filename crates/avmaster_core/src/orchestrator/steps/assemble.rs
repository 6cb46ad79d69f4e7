//! Assemble step - writes the deliverable from the plan and body.

use crate::assembly::Assembler;
use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, StepOutcome};

/// Runs the assembler for the job's destination.
pub struct AssembleStep;

impl AssembleStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AssembleStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for AssembleStep {
    fn name(&self) -> &str {
        "Assemble"
    }

    fn validate_input(&self, _ctx: &Context) -> StepResult<()> {
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        let plan = state
            .plan
            .as_ref()
            .ok_or_else(|| StepError::invalid_input("No plan available"))?;
        let body = state
            .body
            .as_ref()
            .ok_or_else(|| StepError::invalid_input("No body segment available"))?;

        let assembler = Assembler::new(ctx.provisioner.clone(), ctx.transcoder.clone());
        let output = assembler.assemble(
            plan,
            body,
            &ctx.job.output,
            state.replace_existing,
            &ctx.scratch,
            &ctx.effects,
        )?;

        ctx.logger
            .success(&format!("Output: {}", output.display()));
        state.output = Some(output);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, ctx: &Context, state: &JobState) -> StepResult<()> {
        match state.output {
            Some(ref output) if ctx.effects.exists(output) => Ok(()),
            Some(ref output) => Err(StepError::invalid_output(format!(
                "Output file missing: {}",
                output.display()
            ))),
            None => Err(StepError::invalid_output("Output not recorded")),
        }
    }
}
