//! Transcoding engine integration.
//!
//! The engine is an opaque batch command: it receives a request, produces
//! one file, or fails. This module builds the ffmpeg tokens for each
//! request kind and maps a non-zero exit into `StepError::Transcode`.

mod args;

pub use args::{FfmpegArgsBuilder, TranscodeRequest};

use crate::effects::Effects;
use crate::orchestrator::{StepError, StepResult};

/// Invokes the transcoding engine through the job's [`Effects`].
#[derive(Debug, Clone)]
pub struct Transcoder {
    /// Engine executable (name on PATH or full path).
    program: String,
}

impl Transcoder {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Run one request to completion.
    pub fn run(&self, request: &TranscodeRequest, effects: &Effects) -> StepResult<()> {
        let tokens = FfmpegArgsBuilder::new(request).build();
        effects
            .logger()
            .debug(&format!("Transcode ({})", request.label()));

        let output = effects
            .run_command(&self.program, &tokens, request.output())
            .map_err(|e| {
                StepError::transcode(&self.program, -1, format!("could not start: {}", e))
            })?;

        if !output.success() {
            effects.logger().dump_engine_tail(&self.program);
            let reason = output
                .stderr
                .lines()
                .rev()
                .map(str::trim)
                .find(|l| !l.is_empty())
                .unwrap_or("no diagnostic output")
                .to_string();
            return Err(StepError::transcode(
                &self.program,
                output.exit_code,
                format!("{}: {}", request.label(), reason),
            ));
        }

        Ok(())
    }
}

impl Default for Transcoder {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{CommandOutput, CommandRunner};
    use crate::logging::{JobLogger, LogConfig};
    use crate::models::CanonicalForm;
    use std::io;
    use std::path::PathBuf;
    use std::sync::Arc;

    struct FailingRunner;

    impl CommandRunner for FailingRunner {
        fn run(&self, _program: &str, _args: &[String]) -> io::Result<CommandOutput> {
            Ok(CommandOutput {
                exit_code: 1,
                stdout: String::new(),
                stderr: "Input #0\nclip.wav: Invalid data found when processing input\n"
                    .to_string(),
            })
        }
    }

    fn silence_request() -> TranscodeRequest {
        TranscodeRequest::GenerateSilence {
            output: PathBuf::from("/nowhere/silence.mp3"),
            duration_secs: 1,
            form: CanonicalForm::default(),
        }
    }

    #[test]
    fn non_zero_exit_is_transcode_error() {
        let logger = Arc::new(JobLogger::detached("t", LogConfig::default(), None));
        let effects = Effects::new(Arc::new(FailingRunner), logger, false);

        let err = Transcoder::default()
            .run(&silence_request(), &effects)
            .unwrap_err();
        match err {
            StepError::Transcode {
                tool,
                exit_code,
                message,
            } => {
                assert_eq!(tool, "ffmpeg");
                assert_eq!(exit_code, 1);
                assert!(message.starts_with("generate-silence"));
                assert!(message.contains("Invalid data found"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn dry_run_never_fails() {
        let logger = Arc::new(JobLogger::detached("t", LogConfig::default(), None));
        let effects = Effects::new(Arc::new(FailingRunner), logger, true);

        Transcoder::new("/opt/ffmpeg/bin/ffmpeg")
            .run(&silence_request(), &effects)
            .unwrap();
        assert_eq!(effects.journal().len(), 1);
    }
}
