//! Pipeline orchestrator for coordinating job execution.
//!
//! Each input file is one job, run through a fixed sequence of steps that
//! validate, execute, and record their results.
//!
//! # Architecture
//!
//! ```text
//! Pipeline
//!     ├── Step: Plan       (flags → segment plan, no side effects)
//!     ├── Step: Preflight  (input checks, existing-output policy)
//!     ├── Step: Assets     (head/tail lookup, silence provisioning)
//!     ├── Step: Master     (skipped in bumper-only mode)
//!     └── Step: Assemble   (copy/rename or canonicalize + concat)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use avmaster_core::orchestrator::JobProcessor;
//!
//! let processor = JobProcessor::new(run_context, Transcoder::default());
//! let result = processor.process_job(&FileJob::new("clip.wav", "out/clip.mp3"), None);
//! println!("Completed: {:?}", result.steps_completed);
//! ```

mod errors;
mod pipeline;
mod processor;
mod step;
pub mod steps;
mod types;

pub use errors::{FailureKind, PipelineError, PipelineResult, StepError, StepResult};
pub use pipeline::{Pipeline, PipelineRunResult};
pub use processor::{JobProcessor, JobResult};
pub use step::PipelineStep;
pub use steps::{AssembleStep, AssetsStep, MasterStep, PlanStep, PreflightStep};
pub use types::{Context, JobState, OverwritePrompt, StepOutcome};

/// Create the standard pipeline with all steps in the correct order.
///
/// 1. Plan - validate flags and compute segments
/// 2. Preflight - check input, apply overwrite policy
/// 3. Assets - fail fast on missing idents, provision silence
/// 4. Master - normalize loudness (bumper-only mode skips)
/// 5. Assemble - produce the output file
pub fn create_standard_pipeline() -> Pipeline {
    Pipeline::new()
        .with_step(PlanStep::new())
        .with_step(PreflightStep::new())
        .with_step(AssetsStep::new())
        .with_step(MasterStep::new())
        .with_step(AssembleStep::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_pipeline_order() {
        let pipeline = create_standard_pipeline();
        assert_eq!(
            pipeline.step_names(),
            vec!["Plan", "Preflight", "Assets", "Master", "Assemble"]
        );
    }
}
