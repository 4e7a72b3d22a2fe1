//! Command-line interface for ctmstitch
//!
//! Provides argument parsing using clap derive macros.

use clap::Parser;
use std::path::PathBuf;

/// Stitch overlapping windowed CTM hypotheses into one transcript per recording
#[derive(Parser, Debug)]
#[command(
    name = "ctmstitch",
    version = crate::version_string(),
    about = "Stitch overlapping windowed CTM hypotheses into one transcript per recording"
)]
pub struct Cli {
    /// Segments file mapping utterance ids to recording windows
    #[arg(value_name = "SEGMENTS")]
    pub segments: PathBuf,

    /// Input CTM file, sorted by utterance id ('-' for stdin)
    #[arg(value_name = "CTM_IN")]
    pub ctm_in: PathBuf,

    /// Output CTM file ('-' for stdout)
    #[arg(value_name = "CTM_OUT")]
    pub ctm_out: PathBuf,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress progress output (errors still go to stderr)
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbose output (-v: per-pair overlap detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Abort on the first failed recording instead of continuing the batch
    #[arg(long)]
    pub fail_fast: bool,

    /// Tolerate window start times running backwards when ids sort correctly
    #[arg(long)]
    pub no_strict_time_order: bool,
}
