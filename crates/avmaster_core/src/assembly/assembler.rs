//! Turns an assembly plan into the final output file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use super::manifest::render_manifest;
use super::scratch::Scratch;
use crate::assets::AssetProvisioner;
use crate::effects::Effects;
use crate::models::AssetRole;
use crate::orchestrator::{StepError, StepResult};
use crate::planner::{AssemblyPlan, AssetSource, SegmentRef};
use crate::transcode::{TranscodeRequest, Transcoder};

/// Who owns the body file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyOrigin {
    /// Mastered intermediate in the job's scratch directory.
    Mastered,
    /// The caller's own input; never moved or deleted.
    Caller,
}

/// The body segment handed to assembly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BodySegment {
    pub path: PathBuf,
    pub origin: BodyOrigin,
}

impl BodySegment {
    pub fn mastered(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            origin: BodyOrigin::Mastered,
        }
    }

    pub fn caller(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            origin: BodyOrigin::Caller,
        }
    }

    /// Already in canonical form (mastering encodes straight into it).
    pub fn is_canonical(&self) -> bool {
        self.origin == BodyOrigin::Mastered
    }
}

/// Materializes plans: canonical copies, manifest, one concat call.
pub struct Assembler {
    provisioner: Arc<AssetProvisioner>,
    transcoder: Transcoder,
}

impl Assembler {
    pub fn new(provisioner: Arc<AssetProvisioner>, transcoder: Transcoder) -> Self {
        Self {
            provisioner,
            transcoder,
        }
    }

    /// Produce `dest` from `plan`.
    ///
    /// Refuses with `AlreadyExists` when `dest` exists and
    /// `replace_existing` is false; the destination is left untouched.
    /// Temporaries are created through `scratch` and removed when the
    /// caller closes it.
    pub fn assemble(
        &self,
        plan: &AssemblyPlan,
        body: &BodySegment,
        dest: &Path,
        replace_existing: bool,
        scratch: &Scratch,
        effects: &Effects,
    ) -> StepResult<PathBuf> {
        if effects.exists(dest) && !replace_existing {
            return Err(StepError::already_exists(dest));
        }

        if let Some(parent) = dest.parent() {
            effects
                .create_dir_all(parent)
                .map_err(|e| StepError::io_error("creating output directory", e))?;
        }

        if plan.is_body_only() {
            self.place_body(body, dest, effects)?;
        } else {
            self.concatenate(plan, body, dest, scratch, effects)?;
        }

        Ok(dest.to_path_buf())
    }

    /// Single-segment plan: no concat call, just move or copy the body.
    fn place_body(&self, body: &BodySegment, dest: &Path, effects: &Effects) -> StepResult<()> {
        match body.origin {
            BodyOrigin::Mastered => effects
                .rename(&body.path, dest)
                .map_err(|e| StepError::io_error("moving mastered body to output", e)),
            BodyOrigin::Caller => effects
                .copy(&body.path, dest)
                .map_err(|e| StepError::io_error("copying input to output", e)),
        }
    }

    fn concatenate(
        &self,
        plan: &AssemblyPlan,
        body: &BodySegment,
        dest: &Path,
        scratch: &Scratch,
        effects: &Effects,
    ) -> StepResult<()> {
        let ext = self.provisioner.form().extension.clone();

        let mut canonical: BTreeMap<AssetRole, PathBuf> = BTreeMap::new();
        for asset in plan.assets() {
            let override_path = match asset.source {
                AssetSource::Override => Some(asset.path.as_path()),
                AssetSource::Default => None,
            };
            let target = scratch.path_for(&format!("{}.canonical.{}", asset.role, ext));
            let resolved = self
                .provisioner
                .resolve(asset.role, override_path, &target, effects)?;
            canonical.insert(asset.role, resolved.path);
        }

        let body_path = if body.is_canonical() {
            body.path.clone()
        } else {
            let target = scratch.path_for(&format!("body.canonical.{}", ext));
            self.transcoder.run(
                &TranscodeRequest::Canonicalize {
                    input: body.path.clone(),
                    output: target.clone(),
                    form: self.provisioner.form().clone(),
                },
                effects,
            )?;
            target
        };

        let mut ordered = Vec::with_capacity(plan.len());
        for segment in plan.segments() {
            match segment {
                SegmentRef::Body => ordered.push(body_path.clone()),
                SegmentRef::Asset(asset) => match canonical.get(&asset.role) {
                    Some(path) => ordered.push(path.clone()),
                    None => {
                        return Err(StepError::invalid_output(format!(
                            "no canonical copy for {} segment",
                            asset.role
                        )))
                    }
                },
            }
        }

        let manifest = scratch.path_for("segments.txt");
        effects
            .write_file(&manifest, &render_manifest(&ordered))
            .map_err(|e| StepError::io_error("writing segment manifest", e))?;

        // Concatenate in scratch so a failed call never leaves a partial
        // file at the destination.
        let assembled = scratch.path_for(&format!("assembled.{}", ext));
        self.transcoder.run(
            &TranscodeRequest::Concat {
                manifest,
                output: assembled.clone(),
            },
            effects,
        )?;

        effects
            .rename(&assembled, dest)
            .map_err(|e| StepError::io_error("moving assembled file to output", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{CommandOutput, CommandRunner};
    use crate::logging::{JobLogger, LogConfig};
    use crate::models::{AssetPaths, CanonicalForm, MasteringProfile, RunContext, RunFlags, RunMode};
    use crate::planner::plan;
    use parking_lot::Mutex;
    use std::fs;
    use std::io;
    use tempfile::tempdir;

    #[derive(Default)]
    struct Engine {
        calls: Mutex<Vec<Vec<String>>>,
    }

    impl CommandRunner for Engine {
        fn run(&self, _program: &str, args: &[String]) -> io::Result<CommandOutput> {
            self.calls.lock().push(args.to_vec());
            if let Some(out) = args.last() {
                fs::write(out, b"ID3")?;
            }
            Ok(CommandOutput::ok())
        }
    }

    struct Fixture {
        dir: tempfile::TempDir,
        engine: Arc<Engine>,
        effects: Effects,
        assembler: Assembler,
        assets: AssetPaths,
    }

    fn fixture() -> Fixture {
        let dir = tempdir().unwrap();
        let assets = AssetPaths::in_dir(dir.path().join("assets"));
        fs::create_dir_all(dir.path().join("assets")).unwrap();
        fs::write(&assets.head, b"ID3").unwrap();
        fs::write(&assets.tail, b"ID3").unwrap();

        let engine = Arc::new(Engine::default());
        let logger = Arc::new(JobLogger::detached("clip", LogConfig::default(), None));
        let effects = Effects::new(engine.clone(), logger, false);
        let provisioner = Arc::new(AssetProvisioner::new(
            assets.clone(),
            CanonicalForm::default(),
            Transcoder::default(),
        ));
        Fixture {
            dir,
            engine,
            effects,
            assembler: Assembler::new(provisioner, Transcoder::default()),
            assets,
        }
    }

    fn context(fx: &Fixture, flags: RunFlags) -> RunContext {
        RunContext::new(
            flags,
            fx.assets.clone(),
            MasteringProfile::default(),
            CanonicalForm::default(),
            fx.dir.path().join("tmp"),
        )
    }

    #[test]
    fn full_plan_issues_one_concat_in_order() {
        let fx = fixture();
        let ctx = context(&fx, RunFlags::default());
        let plan = plan(&ctx).unwrap();
        let scratch = Scratch::create(&ctx.temp_root, "clip", false).unwrap();

        let body = scratch.path_for("body.mastered.mp3");
        fs::write(&body, b"ID3").unwrap();
        let dest = fx.dir.path().join("out").join("clip.mp3");

        fx.assembler
            .assemble(
                &plan,
                &BodySegment::mastered(&body),
                &dest,
                false,
                &scratch,
                &fx.effects,
            )
            .unwrap();
        assert!(dest.is_file());

        let manifest = fs::read_to_string(scratch.path().join("segments.txt")).unwrap();
        let names: Vec<String> = manifest
            .lines()
            .map(|l| {
                Path::new(l.trim_start_matches("file '").trim_end_matches('\''))
                    .file_name()
                    .unwrap()
                    .to_string_lossy()
                    .to_string()
            })
            .collect();
        assert_eq!(
            names,
            vec![
                "head.canonical.mp3",
                "body.mastered.mp3",
                "silence.canonical.mp3",
                "tail.canonical.mp3",
                "silence.canonical.mp3",
            ]
        );

        let calls = fx.engine.calls.lock();
        // silence generation, head, silence, tail canonicalization, concat
        assert_eq!(calls.len(), 5);
        assert_eq!(
            calls.iter().filter(|c| c.contains(&"concat".to_string())).count(),
            1
        );
        drop(calls);

        assert!(scratch.close(&fx.effects).is_empty());
        assert_eq!(fs::read_dir(&ctx.temp_root).unwrap().count(), 0);
    }

    #[test]
    fn body_only_copies_caller_input() {
        let fx = fixture();
        let ctx = context(
            &fx,
            RunFlags {
                mode: RunMode::BumperOnly,
                skip_bumper: true,
                ..Default::default()
            },
        );
        let plan = plan(&ctx).unwrap();
        let scratch = Scratch::create(&ctx.temp_root, "clip", false).unwrap();

        let input = fx.dir.path().join("clip.mp3");
        fs::write(&input, b"mastered-bytes").unwrap();
        let dest = fx.dir.path().join("out").join("clip.mp3");

        fx.assembler
            .assemble(
                &plan,
                &BodySegment::caller(&input),
                &dest,
                false,
                &scratch,
                &fx.effects,
            )
            .unwrap();

        assert_eq!(fs::read(&dest).unwrap(), b"mastered-bytes");
        assert!(input.is_file());
        assert!(fx.engine.calls.lock().is_empty());
    }

    #[test]
    fn existing_destination_is_refused_untouched() {
        let fx = fixture();
        let ctx = context(&fx, RunFlags::default());
        let plan = plan(&ctx).unwrap();
        let scratch = Scratch::create(&ctx.temp_root, "clip", false).unwrap();

        let dest = fx.dir.path().join("clip.mp3");
        fs::write(&dest, b"keep me").unwrap();

        let err = fx
            .assembler
            .assemble(
                &plan,
                &BodySegment::mastered(fx.dir.path().join("body.mp3")),
                &dest,
                false,
                &scratch,
                &fx.effects,
            )
            .unwrap_err();

        assert!(matches!(err, StepError::AlreadyExists { .. }));
        assert_eq!(fs::read(&dest).unwrap(), b"keep me");
        assert!(fx.engine.calls.lock().is_empty());
    }

    #[test]
    fn caller_body_is_canonicalized_before_concat() {
        let fx = fixture();
        let ctx = context(
            &fx,
            RunFlags {
                mode: RunMode::BumperOnly,
                ..Default::default()
            },
        );
        let plan = plan(&ctx).unwrap();
        let scratch = Scratch::create(&ctx.temp_root, "clip", false).unwrap();
        let input = fx.dir.path().join("clip.mp3");
        fs::write(&input, b"ID3").unwrap();

        fx.assembler
            .assemble(
                &plan,
                &BodySegment::caller(&input),
                &fx.dir.path().join("final.mp3"),
                false,
                &scratch,
                &fx.effects,
            )
            .unwrap();

        assert!(scratch
            .temporaries()
            .iter()
            .any(|p| p.ends_with("body.canonical.mp3")));
        assert!(input.is_file());
    }
}
