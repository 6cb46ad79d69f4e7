//! The unit of work a [`Pipeline`](super::Pipeline) runs.

use super::errors::StepResult;
use super::types::{Context, JobState, StepOutcome};

/// One stage of producing an output file.
///
/// [`Pipeline::run`](super::Pipeline::run) calls `validate_input`, then
/// `execute`, and `validate_output` only when `execute` reports
/// [`StepOutcome::Success`]. An error from any of them ends the job.
///
/// ```ignore
/// struct PlanStep;
///
/// impl PipelineStep for PlanStep {
///     fn name(&self) -> &str { "Plan" }
///
///     fn validate_input(&self, _ctx: &Context) -> StepResult<()> { Ok(()) }
///
///     fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome> {
///         state.plan = Some(planner::plan(&ctx.run)?);
///         Ok(StepOutcome::Success)
///     }
///
///     fn validate_output(&self, _ctx: &Context, state: &JobState) -> StepResult<()> {
///         match state.plan {
///             Some(_) => Ok(()),
///             None => Err(StepError::invalid_output("no plan recorded")),
///         }
///     }
/// }
/// ```
pub trait PipelineStep: Send + Sync {
    /// Short name used in errors and reports.
    fn name(&self) -> &str;

    fn validate_input(&self, ctx: &Context) -> StepResult<()>;

    /// Do the work, writing results into `state`. A step that has nothing
    /// to do for this job returns [`StepOutcome::Skipped`].
    fn execute(&self, ctx: &Context, state: &mut JobState) -> StepResult<StepOutcome>;

    fn validate_output(&self, ctx: &Context, state: &JobState) -> StepResult<()>;

    /// Phase header written to the job log. Defaults to the name.
    fn description(&self) -> &str {
        self.name()
    }
}
