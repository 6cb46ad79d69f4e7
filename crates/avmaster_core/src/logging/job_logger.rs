//! Per-file job logger.
//!
//! One logger per input file. Lines go to an optional log file and an
//! optional callback (the CLI prints through it). Engine stdout/stderr is
//! kept in a bounded tail that is dumped when a call fails.

use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use parking_lot::Mutex;

use super::types::{LineCallback, LogConfig, LogLevel, MessagePrefix};

/// Where formatted lines go.
struct Sinks {
    file: Option<BufWriter<File>>,
    callback: Option<LineCallback>,
}

pub struct JobLogger {
    job_name: String,
    log_path: Option<PathBuf>,
    config: LogConfig,
    sinks: Mutex<Sinks>,
    engine_tail: Mutex<VecDeque<String>>,
}

impl JobLogger {
    /// Logger that also writes `<log_dir>/<job>.log`, creating `log_dir`.
    pub fn new(
        job_name: impl Into<String>,
        log_dir: impl AsRef<Path>,
        config: LogConfig,
        callback: Option<LineCallback>,
    ) -> io::Result<Self> {
        let mut logger = Self::detached(job_name, config, callback);

        let log_dir = log_dir.as_ref();
        fs::create_dir_all(log_dir)?;
        let path = log_dir.join(log_file_name(&logger.job_name));
        logger.sinks.get_mut().file = Some(BufWriter::new(File::create(&path)?));
        logger.log_path = Some(path);

        Ok(logger)
    }

    /// Logger without a file: dry runs and tests.
    pub fn detached(
        job_name: impl Into<String>,
        config: LogConfig,
        callback: Option<LineCallback>,
    ) -> Self {
        let capacity = config.tail_lines;
        Self {
            job_name: job_name.into(),
            log_path: None,
            config,
            sinks: Mutex::new(Sinks {
                file: None,
                callback,
            }),
            engine_tail: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn job_name(&self) -> &str {
        &self.job_name
    }

    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    pub fn info(&self, message: &str) {
        self.emit(LogLevel::Info, MessagePrefix::None, message);
    }

    pub fn debug(&self, message: &str) {
        self.emit(LogLevel::Debug, MessagePrefix::None, message);
    }

    pub fn warn(&self, message: &str) {
        self.marked(MessagePrefix::Warning, message);
    }

    pub fn error(&self, message: &str) {
        self.marked(MessagePrefix::Error, message);
    }

    /// An engine command line about to run.
    pub fn command(&self, command: &str) {
        self.marked(MessagePrefix::Command, command);
    }

    /// Start of a pipeline step.
    pub fn phase(&self, name: &str) {
        self.marked(MessagePrefix::Phase, name);
    }

    pub fn section(&self, name: &str) {
        self.marked(MessagePrefix::Section, name);
    }

    pub fn success(&self, message: &str) {
        self.marked(MessagePrefix::Success, message);
    }

    /// A side effect that was described, not performed.
    pub fn dry_run(&self, message: &str) {
        self.marked(MessagePrefix::DryRun, message);
    }

    /// Record captured engine output.
    ///
    /// Every line enters the tail; lines are only logged outside compact
    /// mode, stderr tagged as such.
    pub fn engine_output(&self, stdout: &str, stderr: &str) {
        let lines = stdout
            .lines()
            .map(|l| (l, false))
            .chain(stderr.lines().map(|l| (l, true)));

        for (line, is_stderr) in lines {
            if self.config.tail_lines > 0 {
                let mut tail = self.engine_tail.lock();
                while tail.len() >= self.config.tail_lines {
                    tail.pop_front();
                }
                tail.push_back(line.to_string());
            }

            if !self.config.compact {
                let line = if is_stderr {
                    format!("[stderr] {line}")
                } else {
                    line.to_string()
                };
                self.emit(LogLevel::Debug, MessagePrefix::None, &line);
            }
        }
    }

    /// Lines currently held in the engine tail, oldest first.
    pub fn engine_tail(&self) -> Vec<String> {
        self.engine_tail.lock().iter().cloned().collect()
    }

    /// Forget earlier engine output. Called before each engine run so a
    /// failure dump only shows the failing call.
    pub fn clear_engine_tail(&self) {
        self.engine_tail.lock().clear();
    }

    /// Write the engine tail under a `[<program> output]` header. Used
    /// after a failed engine call.
    pub fn dump_engine_tail(&self, program: &str) {
        let tail = self.engine_tail();
        if tail.is_empty() {
            return;
        }
        self.write_line(&format!("[{program} output]"));
        for line in &tail {
            self.write_line(line);
        }
    }

    pub fn flush(&self) {
        if let Some(file) = self.sinks.lock().file.as_mut() {
            let _ = file.flush();
        }
    }

    /// Flush and release the log file. Later lines only reach the callback.
    pub fn close(&self) {
        let mut sinks = self.sinks.lock();
        if let Some(mut file) = sinks.file.take() {
            let _ = file.flush();
        }
    }

    fn marked(&self, prefix: MessagePrefix, message: &str) {
        self.emit(prefix.level(), prefix, message);
    }

    fn emit(&self, level: LogLevel, prefix: MessagePrefix, message: &str) {
        if level >= self.config.level {
            self.write_line(&prefix.format(message));
        }
    }

    fn write_line(&self, line: &str) {
        let line = if self.config.show_timestamps {
            format!("[{}] {}", Local::now().format("%H:%M:%S"), line)
        } else {
            line.to_string()
        };

        let mut sinks = self.sinks.lock();
        if let Some(file) = sinks.file.as_mut() {
            let _ = writeln!(file, "{line}");
        }
        if let Some(callback) = sinks.callback.as_ref() {
            callback(&line);
        }
    }
}

impl Drop for JobLogger {
    fn drop(&mut self) {
        self.close();
    }
}

/// `<job>.log` with characters that are unsafe in file names replaced.
fn log_file_name(job_name: &str) -> String {
    let stem: String = job_name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}.log", stem.trim_start_matches('.'))
}
