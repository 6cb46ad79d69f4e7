//! Batch result types and the run report.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::effects::Action;
use crate::orchestrator::{FailureKind, JobResult};

/// Why a file failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureReason {
    pub kind: FailureKind,
    pub message: String,
}

/// Per-file outcome of a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchResult {
    /// The output was written (or, under dry-run, would have been).
    Produced { output: PathBuf },
    /// The output already existed and was left alone.
    SkippedExisting { output: PathBuf },
    /// Processing failed for this file only.
    Failed(FailureReason),
}

impl BatchResult {
    /// Map a finished job into a batch result.
    ///
    /// An existing-output refusal is a skip, not a failure.
    pub fn from_job(result: &JobResult, output: &Path) -> Self {
        match &result.outcome {
            Ok(path) => BatchResult::Produced {
                output: path.clone(),
            },
            Err(e) if e.kind() == FailureKind::AlreadyExists => BatchResult::SkippedExisting {
                output: output.to_path_buf(),
            },
            Err(e) => BatchResult::Failed(FailureReason {
                kind: e.kind(),
                message: e
                    .step_error()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| e.to_string()),
            }),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, BatchResult::Failed(_))
    }
}

/// One processed input.
#[derive(Debug, Clone, Serialize)]
pub struct BatchEntry {
    pub input: PathBuf,
    pub result: BatchResult,
    /// Side effects for this input (empty when skipped up front).
    #[serde(skip)]
    pub actions: Vec<Action>,
}

/// All entries of a batch, in input order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchOutcome {
    pub entries: Vec<BatchEntry>,
}

impl BatchOutcome {
    /// Mapping input → result.
    pub fn results(&self) -> BTreeMap<PathBuf, BatchResult> {
        self.entries
            .iter()
            .map(|e| (e.input.clone(), e.result.clone()))
            .collect()
    }

    pub fn report(&self, dry_run: bool) -> BatchReport {
        let mut report = BatchReport {
            total: self.entries.len(),
            dry_run,
            generated_at: chrono::Local::now().to_rfc3339(),
            ..Default::default()
        };
        for entry in &self.entries {
            match &entry.result {
                BatchResult::Produced { .. } => report.produced += 1,
                BatchResult::SkippedExisting { .. } => report.skipped += 1,
                BatchResult::Failed(reason) => {
                    report.failed += 1;
                    report.failures.push(FailureLine {
                        input: entry.input.clone(),
                        kind: reason.kind,
                        message: reason.message.clone(),
                    });
                }
            }
        }
        report
    }
}

/// One failure in a report.
#[derive(Debug, Clone, Serialize)]
pub struct FailureLine {
    pub input: PathBuf,
    pub kind: FailureKind,
    pub message: String,
}

/// Summary of a batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub generated_at: String,
    pub dry_run: bool,
    pub total: usize,
    pub produced: usize,
    pub skipped: usize,
    pub failed: usize,
    pub failures: Vec<FailureLine>,
}

impl BatchReport {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// One-line summary for the end of a run.
    pub fn summary(&self) -> String {
        format!(
            "Processing complete: {} produced, {} skipped, {} failed ({} total){}",
            self.produced,
            self.skipped,
            self.failed,
            self.total,
            if self.dry_run { " [dry run]" } else { "" }
        )
    }
}
