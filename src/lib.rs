//! ctmstitch - overlap resolution for time-aligned CTM transcripts
//!
//! Recognition hypotheses decoded per sliding window are stitched into one
//! non-overlapping, chronologically consistent transcript per recording.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod app;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod ctm;
pub mod diagnostics;
pub mod error;
pub mod resolver;

// Data model
pub use catalog::{Segment, SegmentCatalog};
pub use ctm::{HypothesisStream, WordHypothesis, read_hypotheses, write_transcript};

// Core algorithm
pub use resolver::{ResolverOptions, resolve_overlaps};

// Batch driver
pub use app::{RunOptions, RunSummary, run};

// Error handling
pub use error::{Result, StitchError};

// Diagnostics
pub use diagnostics::{CollectingSink, DiagnosticSink, SilentSink, StderrSink};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
