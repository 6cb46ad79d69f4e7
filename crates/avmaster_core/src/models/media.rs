//! Audio format and loudness target descriptions.
//!
//! These are plain values handed to the transcoding engine. Nothing here
//! ever looks at sample data.

use serde::{Deserialize, Serialize};

/// The encoding every segment must share before lossless concatenation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalForm {
    /// Channel count (2 = stereo).
    pub channels: u32,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Constant bitrate in kb/s.
    pub bitrate_kbps: u32,
    /// Encoder passed to the engine.
    pub codec: String,
    /// File extension of the container, without the dot.
    pub extension: String,
}

impl CanonicalForm {
    /// Channel layout name as the engine's lavfi sources expect it.
    pub fn channel_layout(&self) -> &'static str {
        match self.channels {
            1 => "mono",
            _ => "stereo",
        }
    }

    /// Bitrate argument, e.g. `192k`.
    pub fn bitrate_arg(&self) -> String {
        format!("{}k", self.bitrate_kbps)
    }
}

impl Default for CanonicalForm {
    fn default() -> Self {
        Self {
            channels: 2,
            sample_rate: 48_000,
            bitrate_kbps: 192,
            codec: "libmp3lame".to_string(),
            extension: "mp3".to_string(),
        }
    }
}

/// One `acompressor` stage of the dynamics chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressorStage {
    pub threshold_db: f64,
    pub ratio: f64,
    pub attack_ms: f64,
    pub release_ms: f64,
}

impl CompressorStage {
    /// Pre-compression used when aggressive mode is requested.
    pub fn aggressive() -> Self {
        Self {
            threshold_db: -30.0,
            ratio: 6.0,
            attack_ms: 2.0,
            release_ms: 100.0,
        }
    }

    /// Compressor that always runs before loudness normalization.
    pub fn standard() -> Self {
        Self {
            threshold_db: -18.0,
            ratio: 3.0,
            attack_ms: 10.0,
            release_ms: 200.0,
        }
    }

    /// Render as an ffmpeg filter.
    pub fn to_filter(&self) -> String {
        format!(
            "acompressor=threshold={}dB:ratio={}:attack={}:release={}",
            self.threshold_db, self.ratio, self.attack_ms, self.release_ms
        )
    }
}

/// Loudness/dynamics target for a run. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasteringProfile {
    /// Integrated loudness target (LUFS).
    pub integrated_lufs: f64,
    /// True-peak ceiling (dBTP).
    pub true_peak_db: f64,
    /// Loudness range target (LU).
    pub loudness_range: f64,
    /// Standard compressor stage.
    pub compressor: CompressorStage,
    /// Extra stage placed before the standard one, if escalated.
    pub escalation: Option<CompressorStage>,
}

impl MasteringProfile {
    /// The AudioVault delivery target.
    pub fn audiovault() -> Self {
        Self {
            integrated_lufs: -16.3,
            true_peak_db: -2.6,
            loudness_range: 5.0,
            compressor: CompressorStage::standard(),
            escalation: None,
        }
    }

    /// Same profile with the aggressive pre-compression stage enabled.
    pub fn with_aggressive(mut self, aggressive: bool) -> Self {
        self.escalation = aggressive.then(CompressorStage::aggressive);
        self
    }

    /// Swap the stage used for escalation; no-op unless escalated.
    pub fn with_escalation_stage(mut self, stage: CompressorStage) -> Self {
        if self.escalation.is_some() {
            self.escalation = Some(stage);
        }
        self
    }

    pub fn is_aggressive(&self) -> bool {
        self.escalation.is_some()
    }

    /// Full filter chain: optional escalation, compressor, loudnorm.
    pub fn filter_chain(&self) -> String {
        let mut stages = Vec::with_capacity(3);
        if let Some(ref escalation) = self.escalation {
            stages.push(escalation.to_filter());
        }
        stages.push(self.compressor.to_filter());
        stages.push(format!(
            "loudnorm=I={}:LRA={}:TP={}",
            self.integrated_lufs, self.loudness_range, self.true_peak_db
        ));
        stages.join(",")
    }
}

impl Default for MasteringProfile {
    fn default() -> Self {
        Self::audiovault()
    }
}
