//! Bumper asset location, silence generation and canonicalization.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::Serialize;

use crate::effects::Effects;
use crate::models::{AssetPaths, AssetRole, CanonicalForm};
use crate::orchestrator::{StepError, StepResult};
use crate::transcode::{TranscodeRequest, Transcoder};

/// Length of the generated silence clip.
pub const SILENCE_SECONDS: u32 = 1;

/// An asset re-encoded into canonical form for one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalAsset {
    pub role: AssetRole,
    /// File the canonical copy was made from.
    pub source: PathBuf,
    /// The canonical copy (a job temporary).
    pub path: PathBuf,
}

/// Guarantees bumper assets exist and produces canonical copies of them.
///
/// One provisioner is shared by every job in a run. The only state it
/// owns is the guard serializing silence generation.
pub struct AssetProvisioner {
    assets: AssetPaths,
    form: CanonicalForm,
    transcoder: Transcoder,
    silence_guard: Mutex<()>,
}

impl AssetProvisioner {
    pub fn new(assets: AssetPaths, form: CanonicalForm, transcoder: Transcoder) -> Self {
        Self {
            assets,
            form,
            transcoder,
            silence_guard: Mutex::new(()),
        }
    }

    pub fn assets(&self) -> &AssetPaths {
        &self.assets
    }

    pub fn form(&self) -> &CanonicalForm {
        &self.form
    }

    /// Find the file playing `role`, without transcoding it.
    ///
    /// An override replaces the default for this call only and must exist.
    /// A missing default silence clip is generated; missing idents fail.
    pub fn locate(
        &self,
        role: AssetRole,
        override_path: Option<&Path>,
        effects: &Effects,
    ) -> StepResult<PathBuf> {
        if let Some(path) = override_path {
            if !effects.exists(path) || path.is_dir() {
                return Err(StepError::missing_asset(role, path));
            }
            return Ok(path.to_path_buf());
        }

        match role {
            AssetRole::Silence => self.ensure_silence(effects),
            AssetRole::Head | AssetRole::Tail => {
                let path = self.assets.get(role);
                if effects.exists(path) && !path.is_dir() {
                    Ok(path.to_path_buf())
                } else {
                    Err(StepError::missing_asset(role, path))
                }
            }
        }
    }

    /// Make sure the default silence clip exists, generating it if absent.
    ///
    /// Generation is written to a sibling temporary and renamed into place,
    /// under a lock, so concurrent jobs never see a partial clip.
    pub fn ensure_silence(&self, effects: &Effects) -> StepResult<PathBuf> {
        let target = self.assets.silence.clone();
        if effects.exists(&target) {
            return Ok(target);
        }

        let _guard = self.silence_guard.lock();
        if effects.exists(&target) {
            return Ok(target);
        }

        effects
            .logger()
            .info(&format!("Generating silence asset: {}", target.display()));

        let parent = target
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        effects
            .create_dir_all(&parent)
            .map_err(|e| StepError::io_error("creating asset directory", e))?;

        let staging = if effects.is_dry_run() {
            StagingFile::Planned(parent.join(format!(".{}", file_name(&target))))
        } else {
            let temp = tempfile::Builder::new()
                .prefix(".silence-")
                .suffix(&format!(".{}", self.form.extension))
                .tempfile_in(&parent)
                .map_err(|e| StepError::io_error("staging silence asset", e))?;
            StagingFile::Real(temp.into_temp_path())
        };

        self.transcoder.run(
            &TranscodeRequest::GenerateSilence {
                output: staging.path().to_path_buf(),
                duration_secs: SILENCE_SECONDS,
                form: self.form.clone(),
            },
            effects,
        )?;

        effects
            .rename(staging.path(), &target)
            .map_err(|e| StepError::io_error("installing silence asset", e))?;

        Ok(target)
    }

    /// Locate `role` and re-encode it into canonical form at `dest`.
    ///
    /// Canonicalization is never skipped: source assets may sit in mixed
    /// containers even when their names suggest otherwise.
    pub fn resolve(
        &self,
        role: AssetRole,
        override_path: Option<&Path>,
        dest: &Path,
        effects: &Effects,
    ) -> StepResult<CanonicalAsset> {
        let source = self.locate(role, override_path, effects)?;

        self.transcoder.run(
            &TranscodeRequest::Canonicalize {
                input: source.clone(),
                output: dest.to_path_buf(),
                form: self.form.clone(),
            },
            effects,
        )?;

        Ok(CanonicalAsset {
            role,
            source,
            path: dest.to_path_buf(),
        })
    }
}

/// Where a generated clip is written before it is moved into place.
enum StagingFile {
    /// Removed on drop if it was never renamed.
    Real(tempfile::TempPath),
    Planned(PathBuf),
}

impl StagingFile {
    fn path(&self) -> &Path {
        match self {
            StagingFile::Real(temp) => temp,
            StagingFile::Planned(path) => path,
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "asset".to_string())
}
