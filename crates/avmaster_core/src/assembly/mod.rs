//! Assembly of the final deliverable.
//!
//! - **scratch**: unique per-job working directory and temporary cleanup
//! - **manifest**: concat manifest rendering
//! - **assembler**: plan execution (copy/rename or canonicalize + concat)

mod assembler;
mod manifest;
mod scratch;

pub use assembler::{Assembler, BodyOrigin, BodySegment};
pub use manifest::render_manifest;
pub use scratch::{CleanupError, Scratch};
