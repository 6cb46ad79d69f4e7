//! Batch processing.
//!
//! - **discovery**: find inputs by extension, pair them with outputs
//! - **runner**: process each input independently, optionally in parallel
//! - **types**: per-file results and the run report

mod discovery;
mod runner;
mod types;

pub use discovery::{discover_inputs, plan_jobs};
pub use runner::BatchRunner;
pub use types::{BatchEntry, BatchOutcome, BatchReport, BatchResult, FailureLine, FailureReason};
