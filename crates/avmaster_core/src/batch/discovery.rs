//! Input discovery for batch runs.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::models::{FileJob, RunContext};

/// Find batch inputs under `dir`.
///
/// Only regular files the run accepts (by extension) are returned;
/// anything else is silently excluded. Results are sorted so batch order
/// is deterministic.
pub fn discover_inputs(dir: &Path, run: &RunContext, recursive: bool) -> io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    collect(dir, run, recursive, &mut found)?;
    found.sort();

    tracing::info!(
        "Discovered {} input(s) in {} for {} mode",
        found.len(),
        dir.display(),
        run.flags.mode
    );
    Ok(found)
}

fn collect(dir: &Path, run: &RunContext, recursive: bool, found: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            if recursive {
                collect(&path, run, recursive, found)?;
            }
        } else if path.is_file() && run.accepts_input(&path) {
            found.push(path);
        }
    }
    Ok(())
}

/// Pair each input with its output in `output_dir`: same stem, canonical
/// extension. Recursive inputs keep their relative sub-directory.
pub fn plan_jobs(inputs: &[PathBuf], input_dir: &Path, output_dir: &Path, run: &RunContext) -> Vec<FileJob> {
    inputs
        .iter()
        .map(|input| {
            let relative_dir = input
                .parent()
                .and_then(|p| p.strip_prefix(input_dir).ok())
                .unwrap_or_else(|| Path::new(""));
            let output = run.output_path_for(input, &output_dir.join(relative_dir));
            FileJob::new(input.clone(), output)
        })
        .collect()
}
