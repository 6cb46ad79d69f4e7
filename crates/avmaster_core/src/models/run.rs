//! Per-invocation run configuration and per-file jobs.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::enums::{AssetRole, OverwritePolicy, RunMode};
use super::media::{CanonicalForm, MasteringProfile};

/// Flags chosen for one invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunFlags {
    /// Master first, or treat input as already mastered.
    pub mode: RunMode,
    /// Do not add any bumper; output is the body alone.
    pub skip_bumper: bool,
    /// Head ident to use instead of the default one.
    pub custom_head: Option<PathBuf>,
    /// Tail ident to use instead of the default one.
    pub custom_tail: Option<PathBuf>,
    /// Leave the head ident out.
    pub no_head: bool,
    /// Leave the tail block out.
    pub no_tail: bool,
    /// Existing-output policy.
    pub overwrite: OverwritePolicy,
    /// Describe side effects instead of performing them.
    pub dry_run: bool,
}

impl RunFlags {
    /// Override path for a role, if one was given.
    pub fn custom_path(&self, role: AssetRole) -> Option<&Path> {
        match role {
            AssetRole::Head => self.custom_head.as_deref(),
            AssetRole::Tail => self.custom_tail.as_deref(),
            AssetRole::Silence => None,
        }
    }

    /// Whether a role was explicitly omitted.
    pub fn omits(&self, role: AssetRole) -> bool {
        match role {
            AssetRole::Head => self.no_head,
            AssetRole::Tail => self.no_tail,
            AssetRole::Silence => false,
        }
    }
}

/// Well-known default locations of the bumper assets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetPaths {
    pub head: PathBuf,
    pub tail: PathBuf,
    pub silence: PathBuf,
}

impl AssetPaths {
    /// Default assets inside `dir` using the stock file names.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            head: dir.join("avo_head.mp3"),
            tail: dir.join("avo_tail.mp3"),
            silence: dir.join("silence_1s.mp3"),
        }
    }

    pub fn get(&self, role: AssetRole) -> &Path {
        match role {
            AssetRole::Head => &self.head,
            AssetRole::Tail => &self.tail,
            AssetRole::Silence => &self.silence,
        }
    }
}

/// Read-only configuration shared by every stage of every file in a run.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Flags for this run.
    pub flags: RunFlags,
    /// Default asset locations.
    pub assets: AssetPaths,
    /// Whether the default head existed when the run started.
    pub default_head_available: bool,
    /// Active mastering profile.
    pub profile: MasteringProfile,
    /// Target encoding for every segment.
    pub canonical: CanonicalForm,
    /// Root under which per-file scratch directories are created.
    pub temp_root: PathBuf,
    /// Accepted input extensions for the mode (lowercase, no dot).
    /// Empty accepts everything.
    pub input_extensions: Vec<String>,
}

impl RunContext {
    /// Build a context, probing whether the default head is present.
    pub fn new(
        flags: RunFlags,
        assets: AssetPaths,
        profile: MasteringProfile,
        canonical: CanonicalForm,
        temp_root: impl Into<PathBuf>,
    ) -> Self {
        let default_head_available = assets.head.is_file();
        Self {
            flags,
            assets,
            default_head_available,
            profile,
            canonical,
            temp_root: temp_root.into(),
            input_extensions: Vec::new(),
        }
    }

    /// Restrict inputs to the given extensions.
    pub fn with_input_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.input_extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self
    }

    /// Whether `path` has an extension this run's mode accepts.
    pub fn accepts_input(&self, path: &Path) -> bool {
        if self.input_extensions.is_empty() {
            return true;
        }
        path.extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .map(|e| self.input_extensions.iter().any(|x| *x == e))
            .unwrap_or(false)
    }

    pub fn is_dry_run(&self) -> bool {
        self.flags.dry_run
    }

    /// Output path for an input placed in `output_dir`: same stem,
    /// canonical extension.
    pub fn output_path_for(&self, input: &Path, output_dir: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "output".to_string());
        output_dir.join(format!("{}.{}", stem, self.canonical.extension))
    }
}

/// One input file and where its deliverable goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileJob {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl FileJob {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }

    /// Name used for logs: the input's file name.
    pub fn name(&self) -> String {
        self.input
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "Unnamed Job".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn probes_default_head() {
        let dir = tempdir().unwrap();
        let assets = AssetPaths::in_dir(dir.path());

        let ctx = RunContext::new(
            RunFlags::default(),
            assets.clone(),
            MasteringProfile::default(),
            CanonicalForm::default(),
            dir.path(),
        );
        assert!(!ctx.default_head_available);

        std::fs::write(&assets.head, b"ident").unwrap();
        let ctx = RunContext::new(
            RunFlags::default(),
            assets,
            MasteringProfile::default(),
            CanonicalForm::default(),
            dir.path(),
        );
        assert!(ctx.default_head_available);
    }

    #[test]
    fn output_path_uses_canonical_extension() {
        let ctx = RunContext::new(
            RunFlags::default(),
            AssetPaths::in_dir("/assets"),
            MasteringProfile::default(),
            CanonicalForm::default(),
            "/tmp",
        );
        let out = ctx.output_path_for(Path::new("/in/clip.wav"), Path::new("/out"));
        assert_eq!(out, PathBuf::from("/out/clip.mp3"));
    }

    #[test]
    fn extension_filter_is_case_insensitive() {
        let ctx = RunContext::new(
            RunFlags::default(),
            AssetPaths::in_dir("/assets"),
            MasteringProfile::default(),
            CanonicalForm::default(),
            "/tmp",
        );
        assert!(ctx.accepts_input(Path::new("anything.xyz")));

        let ctx = ctx.with_input_extensions([".WAV", "flac"]);
        assert!(ctx.accepts_input(Path::new("/in/Clip.Wav")));
        assert!(ctx.accepts_input(Path::new("/in/b.flac")));
        assert!(!ctx.accepts_input(Path::new("/in/c.mp3")));
        assert!(!ctx.accepts_input(Path::new("/in/noext")));
    }

    #[test]
    fn flags_expose_role_choices() {
        let flags = RunFlags {
            custom_tail: Some(PathBuf::from("/x/tail.mp3")),
            no_head: true,
            ..Default::default()
        };
        assert!(flags.omits(AssetRole::Head));
        assert!(!flags.omits(AssetRole::Silence));
        assert_eq!(
            flags.custom_path(AssetRole::Tail),
            Some(Path::new("/x/tail.mp3"))
        );
        assert_eq!(flags.custom_path(AssetRole::Head), None);
    }
}
