//! Side effects and external process execution.
//!
//! - **runner**: the `CommandRunner` seam and the process-spawning default
//! - **recorder**: `Effects`, the per-job gateway that journals every
//!   mutation and turns them into descriptions under dry-run

mod recorder;
mod runner;

pub use recorder::{Action, Effects};
pub use runner::{CommandOutput, CommandRunner, SystemRunner};
