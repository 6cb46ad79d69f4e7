//! Logging for avmaster.
//!
//! Two layers:
//! - `tracing` for application-wide events (batch start, skips, warnings)
//! - [`JobLogger`] for the per-file transcript: steps, engine commands,
//!   dry-run descriptions and the engine output tail
//!
//! # Example
//!
//! ```no_run
//! use avmaster_core::logging::{JobLogger, LogConfig};
//!
//! let logger = JobLogger::new("clip.wav", "/path/to/logs", LogConfig::default(), None).unwrap();
//!
//! logger.phase("Master");
//! logger.command("ffmpeg -y -i clip.wav ...");
//! logger.success("Finished");
//! ```

mod job_logger;
mod types;

pub use job_logger::JobLogger;
pub use types::{LineCallback, LogConfig, LogLevel, MessagePrefix};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber, writing to stderr.
///
/// `RUST_LOG` wins over `default_level`. Later calls are no-ops.
pub fn init_tracing(default_level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_filter()));

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .try_init();
}

/// Test subscriber: warnings and above, captured per test.
#[cfg(test)]
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_harmless() {
        init_test_tracing();
        init_tracing(LogLevel::Debug);
        init_tracing(LogLevel::Info);
    }
}
