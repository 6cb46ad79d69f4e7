//! Per-job scratch directory and temporary file tracking.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tempfile::TempDir;
use thiserror::Error;

use crate::effects::Effects;

/// A temporary could not be removed. Logged, never returned as a failure.
#[derive(Error, Debug)]
pub enum CleanupError {
    #[error("could not remove temporary {path}: {source}")]
    RemoveFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not remove scratch directory {path}: {source}")]
    RemoveDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

enum ScratchDir {
    Real(TempDir),
    /// Dry runs never create the directory; paths are only described.
    Planned(PathBuf),
}

/// Unique working directory for one job.
///
/// Every temporary handed out by [`Scratch::path_for`] (or registered with
/// [`Scratch::track`]) is removed by [`Scratch::close`], on success and
/// failure alike.
pub struct Scratch {
    dir: ScratchDir,
    temporaries: Mutex<Vec<PathBuf>>,
}

impl Scratch {
    /// Create a fresh directory under `temp_root`.
    ///
    /// Under dry-run nothing is created and a placeholder path is used.
    pub fn create(temp_root: &Path, job_name: &str, dry_run: bool) -> io::Result<Self> {
        let prefix = format!("avmaster-{}-", slug(job_name));
        let dir = if dry_run {
            ScratchDir::Planned(temp_root.join(format!("{}dry-run", prefix)))
        } else {
            fs::create_dir_all(temp_root)?;
            ScratchDir::Real(tempfile::Builder::new().prefix(&prefix).tempdir_in(temp_root)?)
        };
        Ok(Self {
            dir,
            temporaries: Mutex::new(Vec::new()),
        })
    }

    pub fn path(&self) -> &Path {
        match &self.dir {
            ScratchDir::Real(dir) => dir.path(),
            ScratchDir::Planned(path) => path,
        }
    }

    /// Path for a named temporary inside the scratch directory.
    pub fn path_for(&self, name: &str) -> PathBuf {
        let path = self.path().join(name);
        self.track(&path);
        path
    }

    /// Register a temporary produced elsewhere.
    pub fn track(&self, path: &Path) {
        let mut temporaries = self.temporaries.lock();
        if !temporaries.iter().any(|p| p == path) {
            temporaries.push(path.to_path_buf());
        }
    }

    pub fn temporaries(&self) -> Vec<PathBuf> {
        self.temporaries.lock().clone()
    }

    /// Remove every tracked temporary, then the directory itself.
    ///
    /// Removal goes through `effects`, so dry runs describe it. Failures
    /// are logged as warnings and returned for inspection only.
    pub fn close(self, effects: &Effects) -> Vec<CleanupError> {
        let mut errors = Vec::new();

        for path in self.temporaries.into_inner() {
            if !effects.exists(&path) {
                continue;
            }
            if let Err(source) = effects.remove_file(&path) {
                errors.push(CleanupError::RemoveFile { path, source });
            }
        }

        if let ScratchDir::Real(dir) = self.dir {
            let path = dir.path().to_path_buf();
            if let Err(source) = dir.close() {
                errors.push(CleanupError::RemoveDir { path, source });
            }
        }

        for error in &errors {
            effects.logger().warn(&format!("Cleanup: {}", error));
        }
        errors
    }
}

/// File-name-safe form of a job name.
fn slug(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .take(40)
        .collect()
}
