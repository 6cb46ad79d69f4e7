//! Batch runner: every input processed independently.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::logging::LineCallback;
use crate::models::{FileJob, OverwritePolicy};
use crate::orchestrator::{FailureKind, JobProcessor, JobResult};

use super::types::{BatchEntry, BatchOutcome, BatchResult, FailureReason};

/// Runs a work set of jobs, isolating per-file failures.
///
/// With `workers > 1` jobs run on a dedicated rayon pool of that size,
/// which also bounds concurrent engine calls. Result order always matches
/// input order.
pub struct BatchRunner {
    processor: JobProcessor,
    workers: usize,
}

impl BatchRunner {
    pub fn new(processor: JobProcessor, workers: usize) -> Self {
        Self {
            processor,
            workers: workers.max(1),
        }
    }

    pub fn processor(&self) -> &JobProcessor {
        &self.processor
    }

    /// Process a single file outside of a batch.
    pub fn process_file(&self, job: &FileJob, callback: Option<LineCallback>) -> JobResult {
        self.processor.process_job(job, callback)
    }

    /// Process every job; one file's failure never stops the others.
    ///
    /// When several inputs map to the same output, the first one in `jobs`
    /// owns it and the rest fail with [`FailureKind::InvalidInput`] without
    /// running. `callbacks` supplies the per-job line callback (called once
    /// per job, before the job starts).
    pub fn run_batch<F>(&self, jobs: &[FileJob], callbacks: F) -> BatchOutcome
    where
        F: Fn(&FileJob) -> Option<LineCallback> + Sync,
    {
        tracing::info!("Batch of {} file(s), {} worker(s)", jobs.len(), self.workers);

        let owners = output_owners(jobs);
        let entries: Vec<BatchEntry> = if self.workers > 1 && jobs.len() > 1 {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(self.workers)
                .build()
            {
                Ok(pool) => pool.install(|| {
                    jobs.par_iter()
                        .zip(owners.par_iter())
                        .map(|(job, owner)| self.run_one(job, owner.as_deref(), &callbacks))
                        .collect()
                }),
                Err(e) => {
                    tracing::warn!("Failed to build worker pool: {e}. Running sequentially.");
                    self.run_sequential(jobs, &owners, &callbacks)
                }
            }
        } else {
            self.run_sequential(jobs, &owners, &callbacks)
        };

        BatchOutcome { entries }
    }

    fn run_sequential<F>(
        &self,
        jobs: &[FileJob],
        owners: &[Option<PathBuf>],
        callbacks: &F,
    ) -> Vec<BatchEntry>
    where
        F: Fn(&FileJob) -> Option<LineCallback> + Sync,
    {
        jobs.iter()
            .zip(owners)
            .map(|(job, owner)| self.run_one(job, owner.as_deref(), callbacks))
            .collect()
    }

    /// `owner` is the earlier input that claimed this job's output, if any.
    fn run_one<F>(&self, job: &FileJob, owner: Option<&Path>, callbacks: &F) -> BatchEntry
    where
        F: Fn(&FileJob) -> Option<LineCallback> + Sync,
    {
        if let Some(owner) = owner {
            let reason = FailureReason {
                kind: FailureKind::InvalidInput,
                message: format!(
                    "output {} collides with {}",
                    job.output.display(),
                    owner.display()
                ),
            };
            tracing::warn!("{}: {}", job.name(), reason.message);
            return BatchEntry {
                input: job.input.clone(),
                result: BatchResult::Failed(reason),
                actions: Vec::new(),
            };
        }

        // Cheap idempotency check: no logger, scratch or engine for outputs
        // that are already there.
        if self.processor.run_context().flags.overwrite == OverwritePolicy::Skip
            && job.output.exists()
        {
            tracing::info!(
                "Skipping {} (already exists): {}",
                job.name(),
                job.output.display()
            );
            return BatchEntry {
                input: job.input.clone(),
                result: BatchResult::SkippedExisting {
                    output: job.output.clone(),
                },
                actions: Vec::new(),
            };
        }

        let result = self.processor.process_job(job, callbacks(job));
        let batch_result = BatchResult::from_job(&result, &job.output);

        match &batch_result {
            BatchResult::Failed(reason) => {
                tracing::warn!("{}: {} ({})", job.name(), reason.message, reason.kind)
            }
            BatchResult::Produced { output } => {
                tracing::info!("{} -> {}", job.name(), output.display())
            }
            BatchResult::SkippedExisting { output } => {
                tracing::info!("Skipping {} (already exists): {}", job.name(), output.display())
            }
        }

        BatchEntry {
            input: job.input.clone(),
            result: batch_result,
            actions: result.actions,
        }
    }
}

/// For each job, the input of an earlier job with the same output path.
fn output_owners(jobs: &[FileJob]) -> Vec<Option<PathBuf>> {
    let mut claimed: HashMap<&Path, &Path> = HashMap::with_capacity(jobs.len());
    jobs.iter()
        .map(|job| match claimed.get(job.output.as_path()) {
            Some(owner) => Some(owner.to_path_buf()),
            None => {
                claimed.insert(&job.output, &job.input);
                None
            }
        })
        .collect()
}
