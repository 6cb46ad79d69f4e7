//! Ordered list of steps run against one job.

use super::errors::{PipelineError, PipelineResult, StepError};
use super::step::PipelineStep;
use super::types::{Context, JobState, StepOutcome};

/// Steps run in insertion order; the first error stops the job.
#[derive(Default)]
pub struct Pipeline {
    steps: Vec<Box<dyn PipelineStep>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_step<S: PipelineStep + 'static>(&mut self, step: S) -> &mut Self {
        self.steps.push(Box::new(step));
        self
    }

    pub fn with_step<S: PipelineStep + 'static>(mut self, step: S) -> Self {
        self.add_step(step);
        self
    }

    pub fn run(&self, ctx: &Context, state: &mut JobState) -> PipelineResult<PipelineRunResult> {
        let mut report = PipelineRunResult::default();

        for step in &self.steps {
            let name = step.name();
            ctx.logger.phase(step.description());

            let fail = |stage: &str, err: StepError| {
                ctx.logger.error(&format!("{name}: {stage} failed: {err}"));
                PipelineError::step_failed(&ctx.job_name, name, err)
            };

            step.validate_input(ctx).map_err(|e| fail("input check", e))?;

            match step.execute(ctx, state).map_err(|e| fail("execution", e))? {
                StepOutcome::Success => {
                    step.validate_output(ctx, state)
                        .map_err(|e| fail("output check", e))?;
                    ctx.logger.debug(&format!("{name} done"));
                    report.steps_completed.push(name.to_string());
                }
                StepOutcome::Skipped(reason) => {
                    ctx.logger.info(&format!("{name} skipped: {reason}"));
                    report.steps_skipped.push(name.to_string());
                }
            }
        }

        Ok(report)
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }
}

/// Which steps ran and which had nothing to do.
#[derive(Debug, Clone, Default)]
pub struct PipelineRunResult {
    pub steps_completed: Vec<String>,
    pub steps_skipped: Vec<String>,
}

impl PipelineRunResult {
    pub fn total_steps(&self) -> usize {
        self.steps_completed.len() + self.steps_skipped.len()
    }
}
