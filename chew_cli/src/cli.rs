//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

pub const DEFAULT_CONFIG_PATH: &str = "etc/chew_config.toml";
/// Upper bound for `pace --cycles`.
pub const MAX_PACE_CYCLES: u32 = 10_000;

#[derive(Parser, Debug)]
#[command(name = "chew", version, about = "Slow-eating coach")]
pub struct Cli {
    /// Path to config TOML. A missing file at the default path means defaults.
    #[arg(long, value_name = "FILE", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Emit JSON (results, events and errors) instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); overrides logging.level
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Estimate one meal photo and print the analysis
    Analyze {
        /// JPEG file to analyze
        #[arg(long, value_name = "FILE")]
        image: PathBuf,
    },
    /// Print the pacer timeline for a chew target (virtual time, no waiting)
    Pace {
        /// Chews per bite (0 means 30)
        #[arg(long, value_name = "N")]
        target_chews: u32,
        /// Number of full bite cycles to run (1..=10000)
        #[arg(long, value_name = "K", default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_PACE_CYCLES)))]
        cycles: u32,
    },
    /// Interactive session driven by commands on stdin
    #[command(
        long_about = "Interactive session on the real clock.\n\nCommands, one per line: start, snap, go, pause, end, home, quit.\nWithout --image there is no camera and the demonstration analysis is used."
    )]
    Session {
        /// JPEG used as the camera frame
        #[arg(long, value_name = "FILE")]
        image: Option<PathBuf>,
    },
    /// Validate configuration and report estimator readiness
    SelfCheck,
}
