//! Pipeline step implementations.
//!
//! Each step handles one phase of producing a deliverable.

mod assemble;
mod assets;
mod master;
mod plan;
mod preflight;

pub use assemble::AssembleStep;
pub use assets::AssetsStep;
pub use master::MasterStep;
pub use plan::PlanStep;
pub use preflight::PreflightStep;
