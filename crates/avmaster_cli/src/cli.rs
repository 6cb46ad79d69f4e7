//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

use avmaster_core::models::{OverwritePolicy, RunFlags, RunMode};

/// Master raw recordings and wrap them in AudioVault bumpers.
#[derive(Parser, Debug)]
#[command(name = "avmaster")]
#[command(about = "Master audio and assemble head/tail bumpers")]
#[command(version)]
pub struct Cli {
    /// Input file, or input directory with --batch
    #[arg(required_unless_present = "init_config")]
    pub input: Option<PathBuf>,

    /// Output file, or output directory with --batch
    #[arg(required_unless_present = "init_config")]
    pub output: Option<PathBuf>,

    /// Treat INPUT and OUTPUT as directories and process every matching file
    #[arg(short, long)]
    pub batch: bool,

    /// Input is already mastered; only add bumpers
    #[arg(long, visible_alias = "add-bumper")]
    pub bumper_only: bool,

    /// Do not add any bumper (output is the body alone)
    #[arg(long)]
    pub skip_bumper: bool,

    /// Head ident to use instead of the default one
    #[arg(long, value_name = "FILE")]
    pub head: Option<PathBuf>,

    /// Tail ident to use instead of the default one
    #[arg(long, value_name = "FILE")]
    pub tail: Option<PathBuf>,

    /// Leave the head ident out
    #[arg(long)]
    pub no_head: bool,

    /// Leave the tail block out
    #[arg(long)]
    pub no_tail: bool,

    /// Replace outputs that already exist
    #[arg(short, long, conflicts_with = "confirm")]
    pub force: bool,

    /// Ask before replacing an output that already exists
    #[arg(long)]
    pub confirm: bool,

    /// Print what would be done without changing any file
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Add the aggressive pre-compression stage
    #[arg(long)]
    pub aggressive: bool,

    /// Settings file (defaults to the user config directory)
    #[arg(short, long, value_name = "FILE", env = "AVMASTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Files processed in parallel in batch mode
    #[arg(short, long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub jobs: Option<u16>,

    /// Descend into subdirectories in batch mode
    #[arg(short, long)]
    pub recursive: bool,

    /// Write a JSON report of the batch to FILE
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Write the settings file with defaults if it is missing, then exit
    #[arg(long)]
    pub init_config: bool,

    /// Debug-level application logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn mode(&self) -> RunMode {
        if self.bumper_only {
            RunMode::BumperOnly
        } else {
            RunMode::Master
        }
    }

    pub fn overwrite_policy(&self) -> OverwritePolicy {
        if self.force {
            OverwritePolicy::Force
        } else if self.confirm {
            OverwritePolicy::Confirm
        } else {
            OverwritePolicy::Skip
        }
    }

    /// Flags for the run. Combination checks happen in the planner.
    pub fn run_flags(&self) -> RunFlags {
        RunFlags {
            mode: self.mode(),
            skip_bumper: self.skip_bumper,
            custom_head: self.head.clone(),
            custom_tail: self.tail.clone(),
            no_head: self.no_head,
            no_tail: self.no_tail,
            overwrite: self.overwrite_policy(),
            dry_run: self.dry_run,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_master_with_bumpers() {
        let cli = Cli::try_parse_from(["avmaster", "in.wav", "out.mp3"]).unwrap();
        let flags = cli.run_flags();
        assert_eq!(flags.mode, RunMode::Master);
        assert_eq!(flags.overwrite, OverwritePolicy::Skip);
        assert!(!flags.skip_bumper && !flags.no_head && !flags.no_tail);
        assert!(!flags.dry_run);
        assert_eq!(cli.input, Some(PathBuf::from("in.wav")));
    }

    #[test]
    fn add_bumper_alias_selects_bumper_only() {
        let cli = Cli::try_parse_from(["avmaster", "--add-bumper", "a.mp3", "b.mp3"]).unwrap();
        assert_eq!(cli.mode(), RunMode::BumperOnly);
    }

    #[test]
    fn overrides_and_omissions_map_to_flags() {
        let cli = Cli::try_parse_from([
            "avmaster",
            "--head",
            "/x/head.mp3",
            "--no-tail",
            "--dry-run",
            "in.wav",
            "out.mp3",
        ])
        .unwrap();
        let flags = cli.run_flags();
        assert_eq!(flags.custom_head, Some(PathBuf::from("/x/head.mp3")));
        assert!(flags.no_tail);
        assert!(flags.dry_run);
    }

    #[test]
    fn force_and_confirm_conflict() {
        assert!(Cli::try_parse_from(["avmaster", "--force", "--confirm", "a", "b"]).is_err());
        let cli = Cli::try_parse_from(["avmaster", "--confirm", "a", "b"]).unwrap();
        assert_eq!(cli.overwrite_policy(), OverwritePolicy::Confirm);
    }

    #[test]
    fn paths_required_unless_initializing_config() {
        assert!(Cli::try_parse_from(["avmaster", "only-input.wav"]).is_err());
        let cli = Cli::try_parse_from(["avmaster", "--init-config"]).unwrap();
        assert!(cli.init_config);
        assert!(cli.input.is_none());
    }

    #[test]
    fn zero_jobs_is_rejected() {
        assert!(Cli::try_parse_from(["avmaster", "-b", "-j", "0", "in", "out"]).is_err());
        let cli = Cli::try_parse_from(["avmaster", "-b", "-j", "4", "in", "out"]).unwrap();
        assert_eq!(cli.jobs, Some(4));
    }
}
