//! Data models for avmaster.
//!
//! This module contains the core data structures used throughout the crate:
//! - Enums for asset roles, run mode and overwrite policy
//! - Media descriptions (canonical form, mastering profile)
//! - Run configuration and per-file jobs

mod enums;
mod media;
mod run;

// Re-export all public types
pub use enums::{AssetRole, OverwritePolicy, RunMode};
pub use media::{CanonicalForm, CompressorStage, MasteringProfile};
pub use run::{AssetPaths, FileJob, RunContext, RunFlags};
