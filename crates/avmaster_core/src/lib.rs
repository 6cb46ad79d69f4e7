//! avmaster core - audio deliverable assembly.
//!
//! Masters raw recordings to a loudness target and wraps them in bumper
//! segments (head ident, silence, tail ident). All business logic lives
//! here with no terminal I/O; the `avmaster` binary is a thin front end.

pub mod assembly;
pub mod assets;
pub mod batch;
pub mod config;
pub mod effects;
pub mod logging;
pub mod mastering;
pub mod models;
pub mod orchestrator;
pub mod planner;
pub mod transcode;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_returns_value() {
        crate::logging::init_test_tracing();
        assert!(!version().is_empty());
    }
}
