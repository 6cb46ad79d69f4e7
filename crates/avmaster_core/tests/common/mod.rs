//! Shared helpers: a scripted engine and a sandbox with assets on disk.

#![allow(dead_code)]

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tempfile::TempDir;

use avmaster_core::effects::{Action, CommandOutput, CommandRunner};
use avmaster_core::models::{AssetPaths, CanonicalForm, MasteringProfile, RunContext, RunFlags};
use avmaster_core::orchestrator::JobProcessor;
use avmaster_core::transcode::Transcoder;

/// Engine fake that writes the file a real engine would.
///
/// Mastering prefixes the input's content with `mastered:`, re-encoding
/// copies it, silence is the word `silence` and concatenation joins the
/// listed files with `|`, so the output content shows segment order.
#[derive(Default)]
pub struct Engine {
    calls: Mutex<Vec<Vec<String>>>,
    fail_when: Option<String>,
}

impl Engine {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Exit with status 1 for any call whose tokens contain `token`.
    pub fn failing_on(token: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            fail_when: Some(token.to_string()),
        })
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().clone()
    }

    /// Calls of one kind (see [`call_kind`]).
    pub fn count(&self, kind: &str) -> usize {
        self.calls().iter().filter(|c| call_kind(c) == kind).count()
    }
}

impl CommandRunner for Engine {
    fn run(&self, _program: &str, args: &[String]) -> io::Result<CommandOutput> {
        self.calls.lock().push(args.to_vec());

        if let Some(token) = &self.fail_when {
            if args.iter().any(|a| a.contains(token.as_str())) {
                return Ok(CommandOutput {
                    exit_code: 1,
                    stdout: String::new(),
                    stderr: "Conversion failed!".to_string(),
                });
            }
        }

        let output = PathBuf::from(args.last().cloned().unwrap_or_default());
        let content = match call_kind(args) {
            "silence" => "silence".to_string(),
            "concat" => {
                let manifest = fs::read_to_string(input_of(args))?;
                manifest_paths(&manifest)
                    .iter()
                    .map(fs::read_to_string)
                    .collect::<io::Result<Vec<_>>>()?
                    .join("|")
            }
            "master" => format!("mastered:{}", fs::read_to_string(input_of(args))?),
            _ => fs::read_to_string(input_of(args))?,
        };
        fs::write(output, content)?;
        Ok(CommandOutput::ok())
    }
}

/// Classify an engine call by its tokens.
pub fn call_kind(args: &[String]) -> &'static str {
    if args.iter().any(|a| a.starts_with("anullsrc")) {
        "silence"
    } else if args.iter().any(|a| a == "concat") {
        "concat"
    } else if args.iter().any(|a| a == "-af") {
        "master"
    } else {
        "canonicalize"
    }
}

/// Journal entry with scratch-specific paths stripped.
pub fn action_shape(action: &Action) -> String {
    match action {
        Action::RunCommand { args, .. } => format!("run:{}", call_kind(args)),
        other => other.kind().to_string(),
    }
}

fn input_of(args: &[String]) -> PathBuf {
    args.iter()
        .position(|a| a == "-i")
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from)
        .unwrap_or_default()
}

fn manifest_paths(manifest: &str) -> Vec<PathBuf> {
    manifest
        .lines()
        .filter_map(|l| l.strip_prefix("file '")?.strip_suffix('\''))
        .map(|p| PathBuf::from(p.replace("'\\''", "'")))
        .collect()
}

/// Temporary tree: `assets/` with head and tail, `in/`, `out/`, `tmp/`.
pub struct Sandbox {
    pub root: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        for dir in ["assets", "in", "out", "tmp"] {
            fs::create_dir(root.path().join(dir)).unwrap();
        }
        let sandbox = Self { root };
        fs::write(sandbox.assets().head, "HEAD").unwrap();
        fs::write(sandbox.assets().tail, "TAIL").unwrap();
        sandbox
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.path().join(rel)
    }

    pub fn assets(&self) -> AssetPaths {
        AssetPaths::in_dir(self.path("assets"))
    }

    pub fn temp_root(&self) -> PathBuf {
        self.path("tmp")
    }

    /// Write an input file under `in/` and return its path.
    pub fn input(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path("in").join(name);
        fs::write(&path, content).unwrap();
        path
    }

    pub fn run_context(&self, flags: RunFlags) -> RunContext {
        RunContext::new(
            flags,
            self.assets(),
            MasteringProfile::default(),
            CanonicalForm::default(),
            self.temp_root(),
        )
    }

    pub fn processor(&self, flags: RunFlags, engine: &Arc<Engine>) -> JobProcessor {
        JobProcessor::with_runner(
            self.run_context(flags),
            Transcoder::default(),
            engine.clone(),
        )
    }

    pub fn temp_root_is_empty(&self) -> bool {
        fs::read_dir(self.temp_root()).unwrap().next().is_none()
    }
}

pub fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}
