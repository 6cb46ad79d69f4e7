//! Side-effect gateway with a dry-run switch.
//!
//! Every mutation the pipeline performs (engine invocation, directory
//! creation, file write, copy, rename, removal) goes through [`Effects`].
//! Each action is journaled in both modes; under dry-run it is only
//! described and reported as successful, and its target is remembered so
//! later stages see it as present.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use super::runner::{CommandOutput, CommandRunner};
use crate::logging::JobLogger;

/// One side effect, performed or described.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    RunCommand {
        program: String,
        args: Vec<String>,
        output: PathBuf,
    },
    CreateDir {
        path: PathBuf,
    },
    WriteFile {
        path: PathBuf,
    },
    Copy {
        from: PathBuf,
        to: PathBuf,
    },
    Rename {
        from: PathBuf,
        to: PathBuf,
    },
    RemoveFile {
        path: PathBuf,
    },
}

impl Action {
    /// Short kind name, stable across runs.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::RunCommand { .. } => "run",
            Action::CreateDir { .. } => "mkdir",
            Action::WriteFile { .. } => "write",
            Action::Copy { .. } => "copy",
            Action::Rename { .. } => "rename",
            Action::RemoveFile { .. } => "remove",
        }
    }

    /// Human-readable description for logs.
    pub fn describe(&self) -> String {
        match self {
            Action::RunCommand { program, args, .. } => {
                format!("run {} {}", program, args.join(" "))
            }
            Action::CreateDir { path } => format!("create directory {}", path.display()),
            Action::WriteFile { path } => format!("write {}", path.display()),
            Action::Copy { from, to } => {
                format!("copy {} -> {}", from.display(), to.display())
            }
            Action::Rename { from, to } => {
                format!("rename {} -> {}", from.display(), to.display())
            }
            Action::RemoveFile { path } => format!("remove {}", path.display()),
        }
    }
}

/// Per-job gateway for side effects.
pub struct Effects {
    runner: Arc<dyn CommandRunner>,
    logger: Arc<JobLogger>,
    dry_run: bool,
    journal: Mutex<Vec<Action>>,
    /// Paths that a described action would have created.
    planned: Mutex<HashSet<PathBuf>>,
}

impl Effects {
    pub fn new(runner: Arc<dyn CommandRunner>, logger: Arc<JobLogger>, dry_run: bool) -> Self {
        Self {
            runner,
            logger,
            dry_run,
            journal: Mutex::new(Vec::new()),
            planned: Mutex::new(HashSet::new()),
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn logger(&self) -> &JobLogger {
        &self.logger
    }

    /// Everything performed or described so far, in order.
    pub fn journal(&self) -> Vec<Action> {
        self.journal.lock().clone()
    }

    /// Whether `path` exists, counting paths a dry run would have created.
    pub fn exists(&self, path: &Path) -> bool {
        path.exists() || self.planned.lock().contains(path)
    }

    /// Run an external program that produces `output`.
    ///
    /// Engine stdout/stderr lines replace the job logger's tail buffer.
    pub fn run_command(
        &self,
        program: &str,
        args: &[String],
        output: &Path,
    ) -> io::Result<CommandOutput> {
        let action = Action::RunCommand {
            program: program.to_string(),
            args: args.to_vec(),
            output: output.to_path_buf(),
        };
        if self.skip(action, Some(output)) {
            return Ok(CommandOutput::ok());
        }

        self.logger
            .command(&format!("{} {}", program, args.join(" ")));
        self.logger.clear_engine_tail();
        let result = self.runner.run(program, args)?;

        self.logger.engine_output(&result.stdout, &result.stderr);

        Ok(result)
    }

    pub fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        if path.as_os_str().is_empty() || path.is_dir() {
            return Ok(());
        }
        let action = Action::CreateDir {
            path: path.to_path_buf(),
        };
        if self.skip(action, Some(path)) {
            return Ok(());
        }
        fs::create_dir_all(path)
    }

    pub fn write_file(&self, path: &Path, contents: &str) -> io::Result<()> {
        let action = Action::WriteFile {
            path: path.to_path_buf(),
        };
        if self.skip(action, Some(path)) {
            return Ok(());
        }
        fs::write(path, contents)
    }

    pub fn copy(&self, from: &Path, to: &Path) -> io::Result<()> {
        let action = Action::Copy {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
        };
        if self.skip(action, Some(to)) {
            return Ok(());
        }
        fs::copy(from, to).map(|_| ())
    }

    /// Move a file, falling back to copy + remove across filesystems.
    pub fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        let action = Action::Rename {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
        };
        if self.skip(action, Some(to)) {
            self.planned.lock().remove(from);
            return Ok(());
        }
        if fs::rename(from, to).is_ok() {
            return Ok(());
        }
        fs::copy(from, to)?;
        if let Err(e) = fs::remove_file(from) {
            self.logger.warn(&format!(
                "Moved {} but could not remove the original: {}",
                from.display(),
                e
            ));
        }
        Ok(())
    }

    pub fn remove_file(&self, path: &Path) -> io::Result<()> {
        let action = Action::RemoveFile {
            path: path.to_path_buf(),
        };
        if self.skip(action, None) {
            self.planned.lock().remove(path);
            return Ok(());
        }
        fs::remove_file(path)
    }

    /// Journal the action; under dry-run, describe it and report true.
    fn skip(&self, action: Action, creates: Option<&Path>) -> bool {
        if self.dry_run {
            self.logger.dry_run(&format!("would {}", action.describe()));
            if let Some(path) = creates {
                self.planned.lock().insert(path.to_path_buf());
            }
        }
        self.journal.lock().push(action);
        self.dry_run
    }
}
