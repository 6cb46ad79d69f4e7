//! Job processor: runs one input file through the standard pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use crate::assembly::Scratch;
use crate::assets::AssetProvisioner;
use crate::effects::{Action, CommandRunner, Effects, SystemRunner};
use crate::logging::{JobLogger, LineCallback, LogConfig};
use crate::models::{FileJob, RunContext};
use crate::planner;
use crate::transcode::Transcoder;

use super::errors::PipelineError;
use super::types::{Context, JobState, OverwritePrompt};
use super::{create_standard_pipeline, PipelineRunResult};

/// Result of processing a single job.
#[derive(Debug)]
pub struct JobResult {
    /// Job name (the input's file name).
    pub job_name: String,
    /// Input that was processed.
    pub input: PathBuf,
    /// Output path on success, pipeline error otherwise.
    pub outcome: Result<PathBuf, PipelineError>,
    /// Steps that completed.
    pub steps_completed: Vec<String>,
    /// Steps that were skipped.
    pub steps_skipped: Vec<String>,
    /// Side effects performed or, under dry-run, described.
    pub actions: Vec<Action>,
    /// Log file written for this job, if any.
    pub log_path: Option<PathBuf>,
}

impl JobResult {
    fn setup_failure(job: &FileJob, error: PipelineError) -> Self {
        Self {
            job_name: job.name(),
            input: job.input.clone(),
            outcome: Err(error),
            steps_completed: Vec::new(),
            steps_skipped: Vec::new(),
            actions: Vec::new(),
            log_path: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn output(&self) -> Option<&PathBuf> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&PipelineError> {
        self.outcome.as_ref().err()
    }
}

/// Runs jobs through the pipeline.
///
/// Holds everything shared across the jobs of a run: configuration, the
/// asset provisioner, the engine and the command runner. Each job gets
/// its own logger, effects journal and scratch directory.
pub struct JobProcessor {
    run: Arc<RunContext>,
    provisioner: Arc<AssetProvisioner>,
    transcoder: Transcoder,
    runner: Arc<dyn CommandRunner>,
    log_config: LogConfig,
    log_dir: Option<PathBuf>,
    prompt: Option<Arc<dyn OverwritePrompt>>,
}

impl JobProcessor {
    /// Create a processor that spawns real engine processes.
    pub fn new(run: RunContext, transcoder: Transcoder) -> Self {
        Self::with_runner(run, transcoder, Arc::new(SystemRunner))
    }

    /// Create a processor with a custom command runner.
    pub fn with_runner(
        run: RunContext,
        transcoder: Transcoder,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        let provisioner = Arc::new(AssetProvisioner::new(
            run.assets.clone(),
            run.canonical.clone(),
            transcoder.clone(),
        ));
        Self {
            run: Arc::new(run),
            provisioner,
            transcoder,
            runner,
            log_config: LogConfig::default(),
            log_dir: None,
            prompt: None,
        }
    }

    pub fn with_log_config(mut self, config: LogConfig) -> Self {
        self.log_config = config;
        self
    }

    /// Write one log file per job into `dir` (never under dry-run).
    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    pub fn with_prompt(mut self, prompt: Arc<dyn OverwritePrompt>) -> Self {
        self.prompt = Some(prompt);
        self
    }

    pub fn run_context(&self) -> &RunContext {
        &self.run
    }

    /// Process one job.
    ///
    /// Never panics on job failure; errors are returned in the result. The
    /// flags are planned first, so an invalid combination leaves nothing on
    /// disk. The job's scratch directory is removed on every path.
    pub fn process_job(&self, job: &FileJob, callback: Option<LineCallback>) -> JobResult {
        let job_name = job.name();
        let dry_run = self.run.is_dry_run();

        // Contradictory flags fail here, before a log file or scratch
        // directory exists.
        if let Err(e) = planner::plan(&self.run) {
            tracing::warn!("{}: {}", job_name, e);
            return JobResult::setup_failure(
                job,
                PipelineError::step_failed(&job_name, "Plan", e.into()),
            );
        }

        let logger = match (&self.log_dir, dry_run) {
            (Some(dir), false) => {
                match JobLogger::new(&job_name, dir, self.log_config.clone(), callback) {
                    Ok(l) => Arc::new(l),
                    Err(e) => {
                        return JobResult::setup_failure(
                            job,
                            PipelineError::setup_failed(
                                &job_name,
                                format!("Failed to create log file: {}", e),
                            ),
                        );
                    }
                }
            }
            _ => Arc::new(JobLogger::detached(
                &job_name,
                self.log_config.clone(),
                callback,
            )),
        };

        let scratch = match Scratch::create(&self.run.temp_root, &job_name, dry_run) {
            Ok(s) => s,
            Err(e) => {
                logger.error(&format!("Failed to create scratch directory: {}", e));
                return JobResult::setup_failure(
                    job,
                    PipelineError::setup_failed(
                        &job_name,
                        format!("Failed to create scratch directory: {}", e),
                    ),
                );
            }
        };

        let effects = Effects::new(Arc::clone(&self.runner), Arc::clone(&logger), dry_run);
        let ctx = Context::new(
            job.clone(),
            Arc::clone(&self.run),
            Arc::clone(&logger),
            effects,
            Arc::clone(&self.provisioner),
            self.transcoder.clone(),
            scratch,
        )
        .with_prompt(self.prompt.clone());

        let mut state = JobState::new(&job_name);
        let pipeline = create_standard_pipeline();

        ctx.logger.section(&format!("Job: {}", job_name));
        ctx.logger.info(&format!("Input: {}", job.input.display()));
        ctx.logger.info(&format!("Output: {}", job.output.display()));
        if dry_run {
            ctx.logger.dry_run("no files will be changed");
        }

        let (outcome, run_result) = match pipeline.run(&ctx, &mut state) {
            Ok(run_result) => {
                let output = state.output.clone().unwrap_or_else(|| job.output.clone());
                (Ok(output), run_result)
            }
            Err(e) => {
                ctx.logger.error(&format!("Job failed: {}", e));
                (Err(e), PipelineRunResult::default())
            }
        };

        let log_path = ctx.logger.log_path().map(|p| p.to_path_buf());
        let actions = ctx.finish();
        logger.close();

        JobResult {
            job_name,
            input: job.input.clone(),
            outcome,
            steps_completed: run_result.steps_completed,
            steps_skipped: run_result.steps_skipped,
            actions,
            log_path,
        }
    }
}
