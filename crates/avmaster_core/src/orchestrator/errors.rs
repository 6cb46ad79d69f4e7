//! Job and step failures.
//!
//! A [`StepError`] says what went wrong; [`PipelineError`] wraps it with
//! the job and step it happened in. [`FailureKind`] is the flat category
//! written to batch reports.

use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::AssetRole;
use crate::planner::PlanError;

/// A failed job.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Job '{job_name}' failed at step '{step_name}': {source}")]
    StepFailed {
        job_name: String,
        step_name: String,
        #[source]
        source: StepError,
    },

    /// Scratch directory or log file could not be created.
    #[error("Job '{job_name}' setup failed: {message}")]
    SetupFailed { job_name: String, message: String },
}

impl PipelineError {
    pub fn step_failed(
        job_name: impl Into<String>,
        step_name: impl Into<String>,
        source: StepError,
    ) -> Self {
        Self::StepFailed {
            job_name: job_name.into(),
            step_name: step_name.into(),
            source,
        }
    }

    pub fn setup_failed(job_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SetupFailed {
            job_name: job_name.into(),
            message: message.into(),
        }
    }

    /// Failure category, for reporting.
    pub fn kind(&self) -> FailureKind {
        match self {
            PipelineError::StepFailed { source, .. } => source.kind(),
            PipelineError::SetupFailed { .. } => FailureKind::Setup,
        }
    }

    /// The underlying step error, if any.
    pub fn step_error(&self) -> Option<&StepError> {
        match self {
            PipelineError::StepFailed { source, .. } => Some(source),
            PipelineError::SetupFailed { .. } => None,
        }
    }
}

/// Why a step could not finish.
#[derive(Error, Debug)]
pub enum StepError {
    /// A required asset is absent.
    #[error("Missing {role} asset: {path}")]
    MissingAsset { role: AssetRole, path: String },

    /// The run's flags contradict each other.
    #[error("Invalid flag combination: {0}")]
    InvalidFlagCombination(String),

    /// The transcoding engine failed.
    #[error("{tool} failed with exit code {exit_code}: {message}")]
    Transcode {
        tool: String,
        exit_code: i32,
        message: String,
    },

    /// The destination exists and may not be replaced.
    #[error("Output already exists: {path}")]
    AlreadyExists { path: String },

    /// Input validation failed.
    #[error("Input validation failed: {0}")]
    InvalidInput(String),

    /// Output validation failed.
    #[error("Output validation failed: {0}")]
    InvalidOutput(String),

    /// File I/O error.
    #[error("I/O error in {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: io::Error,
    },
}

impl StepError {
    pub fn missing_asset(role: AssetRole, path: &Path) -> Self {
        Self::MissingAsset {
            role,
            path: path.display().to_string(),
        }
    }

    pub fn invalid_flags(message: impl Into<String>) -> Self {
        Self::InvalidFlagCombination(message.into())
    }

    pub fn transcode(tool: impl Into<String>, exit_code: i32, message: impl Into<String>) -> Self {
        Self::Transcode {
            tool: tool.into(),
            exit_code,
            message: message.into(),
        }
    }

    pub fn already_exists(path: &Path) -> Self {
        Self::AlreadyExists {
            path: path.display().to_string(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn invalid_output(message: impl Into<String>) -> Self {
        Self::InvalidOutput(message.into())
    }

    pub fn io_error(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    /// Failure category, for reporting.
    pub fn kind(&self) -> FailureKind {
        match self {
            StepError::MissingAsset { .. } => FailureKind::MissingAsset,
            StepError::InvalidFlagCombination(_) => FailureKind::InvalidFlagCombination,
            StepError::Transcode { .. } => FailureKind::Transcode,
            StepError::AlreadyExists { .. } => FailureKind::AlreadyExists,
            StepError::InvalidInput(_) => FailureKind::InvalidInput,
            StepError::InvalidOutput(_) => FailureKind::InvalidOutput,
            StepError::Io { .. } => FailureKind::Io,
        }
    }
}

impl From<PlanError> for StepError {
    fn from(err: PlanError) -> Self {
        match err {
            PlanError::InvalidFlagCombination(message) => Self::InvalidFlagCombination(message),
        }
    }
}

/// Serializable failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    MissingAsset,
    InvalidFlagCombination,
    Transcode,
    AlreadyExists,
    InvalidInput,
    InvalidOutput,
    Io,
    Setup,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FailureKind::MissingAsset => "missing asset",
            FailureKind::InvalidFlagCombination => "invalid flag combination",
            FailureKind::Transcode => "transcode error",
            FailureKind::AlreadyExists => "already exists",
            FailureKind::InvalidInput => "invalid input",
            FailureKind::InvalidOutput => "invalid output",
            FailureKind::Io => "i/o error",
            FailureKind::Setup => "setup error",
        };
        f.write_str(name)
    }
}

pub type StepResult<T> = Result<T, StepError>;
pub type PipelineResult<T> = Result<T, PipelineError>;
