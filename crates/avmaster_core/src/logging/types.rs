//! Logging types and configuration.

use serde::{Deserialize, Serialize};

/// Minimum severity a job logger passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// How a job logger formats and filters its lines.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: LogLevel,
    /// Keep engine chatter out of the log; it still feeds the tail.
    pub compact: bool,
    /// Engine lines remembered for the failure dump.
    pub tail_lines: usize,
    /// Prefix each line with the wall-clock time.
    pub show_timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            compact: true,
            tail_lines: 20,
            show_timestamps: true,
        }
    }
}

/// Receives every line a job logger emits, already formatted.
pub type LineCallback = Box<dyn Fn(&str) + Send + Sync>;

/// Marker put in front of a message so log readers can scan by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessagePrefix {
    /// `$ ffmpeg ...`
    Command,
    /// `=== Master ===`
    Phase,
    /// `--- Job: clip.wav ---`
    Section,
    /// `[DRY-RUN] would ...`
    DryRun,
    Success,
    Warning,
    Error,
    /// Plain message.
    None,
}

impl MessagePrefix {
    pub fn format(&self, message: &str) -> String {
        match self {
            MessagePrefix::Command => format!("$ {message}"),
            MessagePrefix::Phase => format!("=== {message} ==="),
            MessagePrefix::Section => format!("--- {message} ---"),
            MessagePrefix::DryRun => format!("[DRY-RUN] {message}"),
            MessagePrefix::Success => format!("[SUCCESS] {message}"),
            MessagePrefix::Warning => format!("[WARNING] {message}"),
            MessagePrefix::Error => format!("[ERROR] {message}"),
            MessagePrefix::None => message.to_string(),
        }
    }

    /// Severity a message of this kind is logged at.
    pub fn level(&self) -> LogLevel {
        match self {
            MessagePrefix::Warning => LogLevel::Warn,
            MessagePrefix::Error => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}
