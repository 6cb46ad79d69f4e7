//! Core types for the orchestrator pipeline.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::assembly::{BodySegment, Scratch};
use crate::assets::AssetProvisioner;
use crate::effects::{Action, Effects};
use crate::logging::JobLogger;
use crate::models::{AssetRole, FileJob, OverwritePolicy, RunContext};
use crate::planner::AssemblyPlan;
use crate::transcode::Transcoder;

/// Asks whether an existing output may be replaced.
///
/// Consulted only under [`OverwritePolicy::Confirm`].
pub trait OverwritePrompt: Send + Sync {
    fn confirm_overwrite(&self, path: &Path) -> bool;
}

/// Read-only context passed to pipeline steps.
///
/// Contains the job, the run configuration and the shared collaborators.
/// Mutable state goes in `JobState`.
pub struct Context {
    /// Input and destination for this job.
    pub job: FileJob,
    /// Run-wide configuration.
    pub run: Arc<RunContext>,
    /// Job name for logs and errors.
    pub job_name: String,
    /// Per-job logger.
    pub logger: Arc<JobLogger>,
    /// Side-effect gateway (journal + dry-run switch).
    pub effects: Effects,
    /// Shared asset provisioner.
    pub provisioner: Arc<AssetProvisioner>,
    /// Engine invoker.
    pub transcoder: Transcoder,
    /// This job's scratch directory.
    pub scratch: Scratch,
    prompt: Option<Arc<dyn OverwritePrompt>>,
}

impl Context {
    pub fn new(
        job: FileJob,
        run: Arc<RunContext>,
        logger: Arc<JobLogger>,
        effects: Effects,
        provisioner: Arc<AssetProvisioner>,
        transcoder: Transcoder,
        scratch: Scratch,
    ) -> Self {
        Self {
            job_name: job.name(),
            job,
            run,
            logger,
            effects,
            provisioner,
            transcoder,
            scratch,
            prompt: None,
        }
    }

    /// Set the prompt used by the confirm overwrite policy.
    pub fn with_prompt(mut self, prompt: Option<Arc<dyn OverwritePrompt>>) -> Self {
        self.prompt = prompt;
        self
    }

    /// Decide whether the existing file at `path` may be replaced.
    ///
    /// `Confirm` without a prompt behaves like `Skip`.
    pub fn may_overwrite(&self, path: &Path) -> bool {
        match self.run.flags.overwrite {
            OverwritePolicy::Skip => false,
            OverwritePolicy::Force => true,
            OverwritePolicy::Confirm => self
                .prompt
                .as_ref()
                .map(|p| p.confirm_overwrite(path))
                .unwrap_or(false),
        }
    }

    /// Close the scratch directory and return the action journal.
    pub fn finish(self) -> Vec<Action> {
        let Context {
            effects,
            scratch,
            logger,
            ..
        } = self;
        scratch.close(&effects);
        logger.flush();
        effects.journal()
    }
}

/// Mutable job state that accumulates results from pipeline steps.
///
/// Steps add their own section and do not overwrite earlier ones.
#[derive(Debug, Clone, Default, Serialize)]
pub struct JobState {
    /// Job identifier.
    pub job_id: String,
    /// When the job started.
    pub started_at: Option<String>,
    /// Segment plan (from Plan step).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<AssemblyPlan>,
    /// Whether an existing destination may be replaced (from Preflight).
    pub replace_existing: bool,
    /// Located asset files by role (from Assets step).
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub assets: BTreeMap<AssetRole, PathBuf>,
    /// Body segment (from Master step).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<BodySegment>,
    /// Final output (from Assemble step).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

impl JobState {
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            started_at: Some(chrono::Local::now().to_rfc3339()),
            ..Default::default()
        }
    }

    pub fn has_plan(&self) -> bool {
        self.plan.is_some()
    }
}

/// Outcome of a step execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Step completed successfully.
    Success,
    /// Step did not apply to this job (not an error).
    Skipped(String),
}
