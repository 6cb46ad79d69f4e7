//! Interactive overwrite confirmation on the terminal.

use std::io::{self, BufRead, Write};
use std::path::Path;

use parking_lot::Mutex;

use avmaster_core::orchestrator::OverwritePrompt;

/// Asks on stdin before an existing output is replaced.
///
/// Questions from parallel workers are serialized so answers cannot be
/// attributed to the wrong file.
#[derive(Default)]
pub struct StdinPrompt {
    lock: Mutex<()>,
}

impl OverwritePrompt for StdinPrompt {
    fn confirm_overwrite(&self, path: &Path) -> bool {
        let _guard = self.lock.lock();

        print!("{} already exists. Overwrite? [y/N] ", path.display());
        if io::stdout().flush().is_err() {
            return false;
        }

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(e) => {
                tracing::warn!("Could not read answer: {e}");
                false
            }
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
