//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Every field has a default so a partial file is always valid.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::logging::{LogConfig, LogLevel};
use crate::models::{AssetPaths, CanonicalForm, CompressorStage, MasteringProfile, RunMode};

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Asset, scratch and log locations.
    #[serde(default)]
    pub paths: PathSettings,

    /// Loudness target and dynamics chain.
    #[serde(default)]
    pub mastering: MasteringSettings,

    /// Canonical segment encoding.
    #[serde(default)]
    pub format: FormatSettings,

    /// Batch discovery and concurrency.
    #[serde(default)]
    pub batch: BatchSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Settings {
    /// Default asset locations, resolved against `paths.assets_dir`.
    pub fn asset_paths(&self) -> AssetPaths {
        let dir = PathBuf::from(&self.paths.assets_dir);
        AssetPaths {
            head: resolve_in(&dir, &self.paths.head),
            tail: resolve_in(&dir, &self.paths.tail),
            silence: resolve_in(&dir, &self.paths.silence),
        }
    }

    /// Mastering profile, escalated when `aggressive` is set here or by flag.
    pub fn mastering_profile(&self, aggressive_flag: bool) -> MasteringProfile {
        MasteringProfile {
            integrated_lufs: self.mastering.integrated_lufs,
            true_peak_db: self.mastering.true_peak_db,
            loudness_range: self.mastering.loudness_range,
            compressor: self.mastering.compressor.clone(),
            escalation: None,
        }
        .with_aggressive(self.mastering.aggressive || aggressive_flag)
        .with_escalation_stage(self.mastering.aggressive_compressor.clone())
    }

    pub fn canonical_form(&self) -> CanonicalForm {
        CanonicalForm {
            channels: self.format.channels,
            sample_rate: self.format.sample_rate,
            bitrate_kbps: self.format.bitrate_kbps,
            codec: self.format.codec.clone(),
            extension: self.format.extension.clone(),
        }
    }

    /// Input extensions accepted in `mode`.
    pub fn input_extensions(&self, mode: RunMode) -> &[String] {
        match mode {
            RunMode::Master => &self.batch.master_extensions,
            RunMode::BumperOnly => &self.batch.bumper_extensions,
        }
    }

    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            level: self.logging.level,
            compact: self.logging.compact,
            tail_lines: self.logging.error_tail as usize,
            show_timestamps: self.logging.show_timestamps,
        }
    }
}

fn resolve_in(dir: &Path, name: &str) -> PathBuf {
    let path = Path::new(name);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        dir.join(path)
    }
}

/// Top-level tables of the settings file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSection {
    Paths,
    Mastering,
    Format,
    Batch,
    Logging,
}

impl ConfigSection {
    pub const ALL: [ConfigSection; 5] = [
        ConfigSection::Paths,
        ConfigSection::Mastering,
        ConfigSection::Format,
        ConfigSection::Batch,
        ConfigSection::Logging,
    ];

    /// TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Mastering => "mastering",
            ConfigSection::Format => "format",
            ConfigSection::Batch => "batch",
            ConfigSection::Logging => "logging",
        }
    }

    /// Comment written above the table when the file is saved.
    pub fn comment(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "Asset, scratch and log locations",
            ConfigSection::Mastering => "Loudness target and dynamics chain",
            ConfigSection::Format => "Canonical segment encoding",
            ConfigSection::Batch => "Batch discovery and concurrency",
            ConfigSection::Logging => "Job transcripts",
        }
    }

    pub fn from_table_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.table_name() == name)
    }
}

/// Path configuration for assets, scratch files and logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Directory holding the default bumper assets.
    #[serde(default = "default_assets_dir")]
    pub assets_dir: String,

    /// Head ident (relative to `assets_dir` unless absolute).
    #[serde(default = "default_head")]
    pub head: String,

    /// Tail ident (relative to `assets_dir` unless absolute).
    #[serde(default = "default_tail")]
    pub tail: String,

    /// One-second silence, generated when missing.
    #[serde(default = "default_silence")]
    pub silence: String,

    /// Root folder for per-file scratch directories.
    #[serde(default = "default_temp_root")]
    pub temp_root: String,

    /// Folder for per-file log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,

    /// Transcoding engine executable.
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: String,
}

fn default_assets_dir() -> String {
    dirs::home_dir()
        .map(|home| home.join("audio-vault-assets"))
        .unwrap_or_else(|| PathBuf::from("audio-vault-assets"))
        .to_string_lossy()
        .to_string()
}

fn default_head() -> String {
    "avo_head.mp3".to_string()
}

fn default_tail() -> String {
    "avo_tail.mp3".to_string()
}

fn default_silence() -> String {
    "silence_1s.mp3".to_string()
}

fn default_temp_root() -> String {
    std::env::temp_dir().to_string_lossy().to_string()
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

fn default_ffmpeg() -> String {
    "ffmpeg".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            assets_dir: default_assets_dir(),
            head: default_head(),
            tail: default_tail(),
            silence: default_silence(),
            temp_root: default_temp_root(),
            logs_folder: default_logs_folder(),
            ffmpeg: default_ffmpeg(),
        }
    }
}

/// Loudness and dynamics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasteringSettings {
    /// Integrated loudness target (LUFS).
    #[serde(default = "default_lufs")]
    pub integrated_lufs: f64,

    /// True-peak ceiling (dBTP).
    #[serde(default = "default_true_peak")]
    pub true_peak_db: f64,

    /// Loudness range target (LU).
    #[serde(default = "default_lra")]
    pub loudness_range: f64,

    /// Always apply the aggressive pre-compression stage.
    #[serde(default)]
    pub aggressive: bool,

    /// Standard compressor stage.
    #[serde(default = "CompressorStage::standard")]
    pub compressor: CompressorStage,

    /// Stage used when aggressive mode is on.
    #[serde(default = "CompressorStage::aggressive")]
    pub aggressive_compressor: CompressorStage,
}

fn default_lufs() -> f64 {
    -16.3
}

fn default_true_peak() -> f64 {
    -2.6
}

fn default_lra() -> f64 {
    5.0
}

impl Default for MasteringSettings {
    fn default() -> Self {
        Self {
            integrated_lufs: default_lufs(),
            true_peak_db: default_true_peak(),
            loudness_range: default_lra(),
            aggressive: false,
            compressor: CompressorStage::standard(),
            aggressive_compressor: CompressorStage::aggressive(),
        }
    }
}

/// Canonical segment encoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatSettings {
    #[serde(default = "default_channels")]
    pub channels: u32,

    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    #[serde(default = "default_bitrate")]
    pub bitrate_kbps: u32,

    #[serde(default = "default_codec")]
    pub codec: String,

    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_channels() -> u32 {
    2
}

fn default_sample_rate() -> u32 {
    48_000
}

fn default_bitrate() -> u32 {
    192
}

fn default_codec() -> String {
    "libmp3lame".to_string()
}

fn default_extension() -> String {
    "mp3".to_string()
}

impl Default for FormatSettings {
    fn default() -> Self {
        Self {
            channels: default_channels(),
            sample_rate: default_sample_rate(),
            bitrate_kbps: default_bitrate(),
            codec: default_codec(),
            extension: default_extension(),
        }
    }
}

/// Batch discovery and concurrency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSettings {
    /// Extensions accepted in mastering mode.
    #[serde(default = "default_master_extensions")]
    pub master_extensions: Vec<String>,

    /// Extensions accepted in bumper-only mode.
    #[serde(default = "default_bumper_extensions")]
    pub bumper_extensions: Vec<String>,

    /// Parallel files (1 = sequential).
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Descend into subdirectories.
    #[serde(default)]
    pub recursive: bool,
}

fn default_master_extensions() -> Vec<String> {
    ["wav", "aac", "eac3", "flac"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_bumper_extensions() -> Vec<String> {
    vec!["mp3".to_string()]
}

fn default_workers() -> usize {
    1
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            master_extensions: default_master_extensions(),
            bumper_extensions: default_bumper_extensions(),
            workers: default_workers(),
            recursive: false,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Minimum level for job and application logs.
    #[serde(default)]
    pub level: LogLevel,

    /// Keep engine output in the tail buffer only.
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Number of engine output lines shown on failure.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,

    /// Prefix log lines with the time of day.
    #[serde(default = "default_true")]
    pub show_timestamps: bool,

    /// Write one log file per input into `paths.logs_folder`.
    #[serde(default)]
    pub write_job_logs: bool,
}

fn default_true() -> bool {
    true
}

fn default_error_tail() -> u32 {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            compact: true,
            error_tail: default_error_tail(),
            show_timestamps: true,
            write_job_logs: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings.mastering.integrated_lufs, -16.3);
        assert_eq!(settings.format.sample_rate, 48_000);
        assert_eq!(settings.batch.workers, 1);
        assert_eq!(settings.batch.bumper_extensions, vec!["mp3".to_string()]);
    }

    #[test]
    fn asset_paths_resolve_against_assets_dir() {
        let mut settings = Settings::default();
        settings.paths.assets_dir = "/srv/assets".to_string();
        settings.paths.tail = "/elsewhere/tail.mp3".to_string();

        let assets = settings.asset_paths();
        assert_eq!(assets.head, PathBuf::from("/srv/assets/avo_head.mp3"));
        assert_eq!(assets.tail, PathBuf::from("/elsewhere/tail.mp3"));
        assert_eq!(assets.silence, PathBuf::from("/srv/assets/silence_1s.mp3"));
    }

    #[test]
    fn aggressive_flag_or_setting_escalates() {
        let mut settings = Settings::default();
        assert!(!settings.mastering_profile(false).is_aggressive());
        assert!(settings.mastering_profile(true).is_aggressive());

        settings.mastering.aggressive = true;
        assert!(settings.mastering_profile(false).is_aggressive());
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let settings: Settings = toml::from_str("[format]\nbitrate_kbps = 256\n").unwrap();
        let form = settings.canonical_form();
        assert_eq!(form.bitrate_kbps, 256);
        assert_eq!(form.channels, 2);
    }

    #[test]
    fn input_extensions_follow_mode() {
        let settings = Settings::default();
        assert!(settings
            .input_extensions(RunMode::Master)
            .contains(&"wav".to_string()));
        assert_eq!(settings.input_extensions(RunMode::BumperOnly), ["mp3"]);
    }
}
