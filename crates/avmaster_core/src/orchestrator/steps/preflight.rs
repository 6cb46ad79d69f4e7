//! Preflight step - input and destination checks before any work.

use std::fs;
use std::path::Path;

use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, StepOutcome};

/// Checks the input file and applies the existing-output policy.
pub struct PreflightStep;

impl PreflightStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PreflightStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for PreflightStep {
    fn name(&self) -> &str {
        "Preflight"
    }

    fn validate_input(&self, ctx: &Context) -> StepResult<()> {
        let input = &ctx.job.input;
        if !input.is_file() {
            return Err(StepError::invalid_input(format!(
                "Input not found: {}",
                input.display()
            )));
        }

        if !ctx.run.accepts_input(input) {
            return Err(StepError::invalid_input(format!(
                "{} is not a {} input (expected: {})",
                input.display(),
                ctx.run.flags.mode,
                ctx.run.input_extensions.join(", ")
            )));
        }

        if same_file(input, &ctx.job.output) {
            return Err(StepError::invalid_input(format!(
                "Output would replace the input: {}",
                input.display()
            )));
        }

        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        let output = &ctx.job.output;
        if !ctx.effects.exists(output) {
            return Ok(StepOutcome::Success);
        }

        if !ctx.may_overwrite(output) {
            return Err(StepError::already_exists(output));
        }

        ctx.logger
            .warn(&format!("Overwriting existing output: {}", output.display()));
        state.replace_existing = true;
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, _state: &JobState) -> StepResult<()> {
        Ok(())
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
