//! Mastering stage.
//!
//! Skipped in bumper-only mode, where the caller's input is the body.

mod normalizer;

pub use normalizer::Normalizer;
