//! Core enums used throughout the application.

use serde::{Deserialize, Serialize};

/// Fixed role an auxiliary audio asset plays in a deliverable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetRole {
    /// Ident played before the body.
    Head,
    /// Ident played after the body.
    Tail,
    /// One second of padding around the tail.
    Silence,
}

impl AssetRole {
    /// Stable lowercase name, used for scratch file names and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetRole::Head => "head",
            AssetRole::Tail => "tail",
            AssetRole::Silence => "silence",
        }
    }
}

impl std::fmt::Display for AssetRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the input still needs mastering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunMode {
    /// Raw recording: master, then assemble.
    #[default]
    Master,
    /// Input is already mastered: only assemble.
    BumperOnly,
}

impl RunMode {
    /// Whether the normalizer runs in this mode.
    pub fn masters(&self) -> bool {
        matches!(self, RunMode::Master)
    }
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunMode::Master => write!(f, "mastering"),
            RunMode::BumperOnly => write!(f, "bumper-only"),
        }
    }
}

/// What to do when the destination file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverwritePolicy {
    /// Leave the existing file alone.
    #[default]
    Skip,
    /// Replace it.
    Force,
    /// Ask through the configured prompt; no prompt means skip.
    Confirm,
}

impl std::fmt::Display for OverwritePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverwritePolicy::Skip => write!(f, "skip"),
            OverwritePolicy::Force => write!(f, "force"),
            OverwritePolicy::Confirm => write!(f, "confirm"),
        }
    }
}
