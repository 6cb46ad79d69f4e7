//! Loudness/dynamics mastering of a raw input.

use std::path::{Path, PathBuf};

use crate::effects::Effects;
use crate::models::{CanonicalForm, MasteringProfile};
use crate::orchestrator::{StepError, StepResult};
use crate::transcode::{TranscodeRequest, Transcoder};

/// Runs the mastering chain in a single engine call.
///
/// The output is already in canonical form, so the mastered body can go
/// straight into concatenation.
#[derive(Debug, Clone)]
pub struct Normalizer {
    profile: MasteringProfile,
    form: CanonicalForm,
    transcoder: Transcoder,
}

impl Normalizer {
    pub fn new(profile: MasteringProfile, form: CanonicalForm, transcoder: Transcoder) -> Self {
        Self {
            profile,
            form,
            transcoder,
        }
    }

    pub fn profile(&self) -> &MasteringProfile {
        &self.profile
    }

    /// File name for the mastered intermediate.
    pub fn intermediate_name(&self) -> String {
        format!("body.mastered.{}", self.form.extension)
    }

    /// Master `input` into `output`, returning the intermediate path.
    ///
    /// The input is never modified or removed.
    pub fn master(&self, input: &Path, output: &Path, effects: &Effects) -> StepResult<PathBuf> {
        if !effects.exists(input) {
            return Err(StepError::invalid_input(format!(
                "Input not found: {}",
                input.display()
            )));
        }

        effects.logger().info(&format!(
            "Mastering to {} LUFS (TP {} dB, LRA {}){}",
            self.profile.integrated_lufs,
            self.profile.true_peak_db,
            self.profile.loudness_range,
            if self.profile.is_aggressive() {
                ", aggressive"
            } else {
                ""
            }
        ));

        self.transcoder.run(
            &TranscodeRequest::Master {
                input: input.to_path_buf(),
                output: output.to_path_buf(),
                profile: self.profile.clone(),
                form: self.form.clone(),
            },
            effects,
        )?;

        Ok(output.to_path_buf())
    }
}
