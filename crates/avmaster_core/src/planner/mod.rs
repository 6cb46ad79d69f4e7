//! Segment planning.
//!
//! Turns a run's flags into the ordered list of segments for each output
//! file. Planning is pure and side-effect-free, so contradictory flags are
//! rejected before any audio is processed.
//!
//! ```text
//! [head] body [silence tail silence]
//! ```

mod plan;
mod validation;

pub use plan::{plan, AssemblyPlan, AssetRef, AssetSource, SegmentRef};
pub use validation::validate_flags;

use thiserror::Error;

/// Errors from planning.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("Invalid flag combination: {0}")]
    InvalidFlagCombination(String),
}

impl PlanError {
    fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidFlagCombination(message.into())
    }
}
