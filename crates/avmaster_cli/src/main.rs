//! avmaster - command-line front end.
//!
//! Single-file mode turns one recording into one deliverable and exits
//! non-zero on any failure. Batch mode processes every matching file in a
//! directory, reports per-file failures and always exits zero.

mod cli;
mod prompt;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use tracing::info;

use avmaster_core::batch::{discover_inputs, plan_jobs, BatchResult, BatchRunner};
use avmaster_core::config::{ConfigManager, Settings};
use avmaster_core::logging::{init_tracing, LineCallback, LogLevel};
use avmaster_core::models::{FileJob, OverwritePolicy, RunContext};
use avmaster_core::orchestrator::{FailureKind, JobProcessor};
use avmaster_core::transcode::Transcoder;

use crate::cli::Cli;
use crate::prompt::StdinPrompt;

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    });

    let config_path = cli.config.clone().unwrap_or_else(ConfigManager::default_path);
    let mut config = ConfigManager::new(&config_path);

    if cli.init_config {
        config
            .load_or_create()
            .with_context(|| format!("Failed to initialize {}", config_path.display()))?;
        println!("Settings: {}", config.path().display());
        return Ok(());
    }

    config
        .load_or_default()
        .with_context(|| format!("Failed to load {}", config_path.display()))?;
    let settings = config.into_settings();

    let (input, output) = match (&cli.input, &cli.output) {
        (Some(i), Some(o)) => (i.clone(), o.clone()),
        _ => bail!("INPUT and OUTPUT are required"),
    };

    let run = build_run_context(&cli, &settings);
    info!(
        "avmaster {} ({} mode, overwrite: {})",
        avmaster_core::version(),
        run.flags.mode,
        run.flags.overwrite
    );

    if cli.batch {
        run_batch(&cli, &settings, run, &input, &output)
    } else {
        run_single(&settings, run, &input, &output)
    }
}

/// Settings plus flags, frozen for the whole run.
fn build_run_context(cli: &Cli, settings: &Settings) -> RunContext {
    let flags = cli.run_flags();
    let extensions = settings.input_extensions(flags.mode).to_vec();
    RunContext::new(
        flags,
        settings.asset_paths(),
        settings.mastering_profile(cli.aggressive),
        settings.canonical_form(),
        &settings.paths.temp_root,
    )
    .with_input_extensions(extensions)
}

fn build_processor(settings: &Settings, run: RunContext, output_dir: &Path) -> JobProcessor {
    let confirm = run.flags.overwrite == OverwritePolicy::Confirm;
    let mut processor = JobProcessor::new(run, Transcoder::new(&settings.paths.ffmpeg))
        .with_log_config(settings.log_config());

    if settings.logging.write_job_logs {
        processor = processor.with_log_dir(output_dir.join(&settings.paths.logs_folder));
    }
    if confirm {
        processor = processor.with_prompt(Arc::new(StdinPrompt::default()));
    }
    processor
}

fn print_lines() -> LineCallback {
    Box::new(|line: &str| println!("{line}"))
}

fn run_single(settings: &Settings, run: RunContext, input: &Path, output: &Path) -> Result<()> {
    if input.is_dir() {
        bail!("{} is a directory (use --batch)", input.display());
    }

    let dry_run = run.is_dry_run();
    let output_dir = output
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let processor = build_processor(settings, run, &output_dir);

    let job = FileJob::new(input, output);
    let result = processor.process_job(&job, Some(print_lines()));

    match &result.outcome {
        Ok(path) => {
            if dry_run {
                println!(
                    "Dry run: {} action(s) described, nothing written",
                    result.actions.len()
                );
            } else {
                println!("Wrote {}", path.display());
            }
            Ok(())
        }
        Err(e) if e.kind() == FailureKind::AlreadyExists => {
            println!("Skipping {} (already exists)", output.display());
            Ok(())
        }
        Err(e) => Err(anyhow!("{}", e)),
    }
}

fn run_batch(
    cli: &Cli,
    settings: &Settings,
    run: RunContext,
    input_dir: &Path,
    output_dir: &Path,
) -> Result<()> {
    if !input_dir.is_dir() {
        bail!("Input directory not found: {}", input_dir.display());
    }

    let dry_run = run.is_dry_run();
    let recursive = cli.recursive || settings.batch.recursive;
    let inputs = discover_inputs(input_dir, &run, recursive)
        .with_context(|| format!("Failed to read {}", input_dir.display()))?;
    let jobs = plan_jobs(&inputs, input_dir, output_dir, &run);

    let workers = cli
        .jobs
        .map(usize::from)
        .unwrap_or(settings.batch.workers);
    let runner = BatchRunner::new(build_processor(settings, run, output_dir), workers);

    let outcome = runner.run_batch(&jobs, |job| {
        let name = job.name();
        let callback: LineCallback = Box::new(move |line: &str| println!("[{name}] {line}"));
        Some(callback)
    });

    for entry in &outcome.entries {
        if let BatchResult::Failed(reason) = &entry.result {
            println!("FAILED {}: {}", entry.input.display(), reason.message);
        }
    }

    let report = outcome.report(dry_run);
    println!("{}", report.summary());

    if let Some(path) = &cli.report {
        let json = report
            .to_json_pretty()
            .context("Failed to serialize batch report")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        info!("Report written to {}", path.display());
    }

    Ok(())
}
