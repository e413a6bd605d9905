//! CLI Module
//!
//! Command-line interface for sndfx: a one-shot batch mode driven by flags
//! and a line-oriented interactive mode.

pub mod commands;
pub mod interactive;

use clap::Parser;
use std::path::PathBuf;

/// sndfx - apply reverb, chorus or pitch shift to a mono WAV file
#[derive(Parser, Debug)]
#[command(name = "sndfx")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Start the interactive editor instead of batch processing
    #[arg(short, long)]
    pub gui: bool,

    /// Input WAV file
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output WAV file (default: current date and time, e.g. 19_10_2026_14_03_59.wav)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Filter to apply: reverb, chorus or pitchshifter
    #[arg(short, long, default_value = "reverb")]
    pub filter: String,

    /// Filter parameters as a JSON object, e.g. '{"room_size": 0.5}'
    #[arg(short, long)]
    pub params: Option<String>,

    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// List filters with their parameters and exit
    #[arg(long)]
    pub list_filters: bool,
}

/// What the binary does for a parsed command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Interactive,
    ListFilters,
    Batch,
}

impl Cli {
    /// Selected front end. `--gui` wins over `--list-filters`, which wins over batch flags.
    pub fn mode(&self) -> Mode {
        if self.gui {
            Mode::Interactive
        } else if self.list_filters {
            Mode::ListFilters
        } else {
            Mode::Batch
        }
    }

    /// Default log filter for `env_logger`
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}
