//! Plan step - derives the segment plan from the run's flags.

use crate::orchestrator::errors::{StepError, StepResult};
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, JobState, StepOutcome};
use crate::planner;

/// Computes the assembly plan. Touches nothing on disk.
pub struct PlanStep;

impl PlanStep {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PlanStep {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineStep for PlanStep {
    fn name(&self) -> &str {
        "Plan"
    }

    fn description(&self) -> &str {
        "Plan segments"
    }

    fn validate_input(&self, _ctx: &Context) -> StepResult<()> {
        Ok(())
    }

    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
        let plan = planner::plan(&ctx.run)?;
        ctx.logger.info(&format!("Segments: {}", plan.describe()));
        state.plan = Some(plan);
        Ok(StepOutcome::Success)
    }

    fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
        match state.plan {
            Some(ref plan) => plan.check_invariants().map_err(StepError::invalid_output),
            None => Err(StepError::invalid_output("Plan not recorded")),
        }
    }
}
