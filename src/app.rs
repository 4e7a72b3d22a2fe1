//! Composition root: load the catalog, read the stream, fan out one task
//! per recording, and write the reconciled transcripts.

use crate::catalog::SegmentCatalog;
use crate::ctm::reader::{HypothesisStream, read_hypotheses};
use crate::ctm::record::WordHypothesis;
use crate::ctm::writer::write_transcript;
use crate::diagnostics::DiagnosticSink;
use crate::error::{Result, StitchError};
use crate::resolver::{ResolverOptions, resolve_overlaps};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;

/// Everything one run needs, CLI and config already merged.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub segments: PathBuf,
    pub ctm_in: PathBuf,
    pub ctm_out: PathBuf,
    pub fail_fast: bool,
    pub strict_time_order: bool,
}

/// Counts reported after a completed run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub recordings_written: usize,
    pub words_written: usize,
}

/// Run the full pipeline: catalog + stream → per-recording resolution →
/// transcript output.
///
/// A malformed catalog or hypothesis stream aborts the whole run before any
/// resolution starts. Resolution failures are isolated per recording: the
/// failure is reported with full context and the remaining recordings still
/// produce output, but the run as a whole returns `RecordingsFailed` (the
/// process must exit non-zero if anything was lost). With `fail_fast` the
/// first failed recording's error is returned instead and nothing is
/// written.
pub async fn run(options: &RunOptions, diag: Arc<dyn DiagnosticSink>) -> Result<RunSummary> {
    let catalog = Arc::new(SegmentCatalog::load_path(&options.segments)?);
    diag.info(&format!(
        "Read {} segments from {}",
        catalog.len(),
        options.segments.display()
    ));

    let stream = {
        let reader = open_input(&options.ctm_in)?;
        read_hypotheses(reader, &catalog, diag.as_ref())?
    };

    let resolver_options = ResolverOptions {
        strict_time_order: options.strict_time_order,
    };
    let mut results = resolve_all(stream, catalog, &resolver_options, Arc::clone(&diag)).await?;

    if options.fail_fast {
        let first_failure = results
            .iter()
            .find_map(|(id, result)| result.is_err().then(|| id.clone()));
        if let Some(recording_id) = first_failure
            && let Some(Err(e)) = results.remove(&recording_id)
        {
            diag.error(&format!("Failed to resolve recording {}: {}", recording_id, e));
            return Err(e);
        }
    }

    let mut failed = Vec::new();
    let mut summary = RunSummary::default();
    let mut out = open_output(&options.ctm_out)?;
    for (recording_id, result) in results {
        match result {
            Ok(words) => {
                write_transcript(&mut out, &words)?;
                summary.recordings_written += 1;
                summary.words_written += words.len();
            }
            Err(e) => {
                diag.error(&format!("Failed to resolve recording {}: {}", recording_id, e));
                failed.push(recording_id);
            }
        }
    }
    out.flush()?;

    diag.info(&format!(
        "Wrote {} words for {} recording(s).",
        summary.words_written, summary.recordings_written
    ));
    if !failed.is_empty() {
        return Err(StitchError::RecordingsFailed { failed });
    }
    Ok(summary)
}

/// Resolve every recording in its own blocking task.
///
/// Recordings are mutually independent: each task owns its slice of the
/// hypothesis map and shares the catalog read-only, so there is nothing to
/// lock. Results come back keyed by recording id for deterministic output
/// order.
pub async fn resolve_all(
    stream: HypothesisStream,
    catalog: Arc<SegmentCatalog>,
    options: &ResolverOptions,
    diag: Arc<dyn DiagnosticSink>,
) -> Result<BTreeMap<String, Result<Vec<WordHypothesis>>>> {
    let mut tasks = JoinSet::new();
    for (recording_id, utterances) in stream {
        let catalog = Arc::clone(&catalog);
        let diag = Arc::clone(&diag);
        let options = options.clone();
        tasks.spawn_blocking(move || {
            let result =
                resolve_overlaps(&recording_id, utterances, &catalog, &options, diag.as_ref());
            (recording_id, result)
        });
    }

    let mut results = BTreeMap::new();
    while let Some(joined) = tasks.join_next().await {
        let (recording_id, result) = joined.map_err(|e| StitchError::Internal {
            message: format!("recording task failed to join: {}", e),
        })?;
        results.insert(recording_id, result);
    }
    Ok(results)
}

fn open_input(path: &Path) -> Result<Box<dyn BufRead>> {
    if path.as_os_str() == "-" {
        Ok(Box::new(BufReader::new(io::stdin())))
    } else {
        Ok(Box::new(BufReader::new(File::open(path)?)))
    }
}

fn open_output(path: &Path) -> Result<Box<dyn Write>> {
    if path.as_os_str() == "-" {
        Ok(Box::new(io::stdout()))
    } else {
        Ok(Box::new(BufWriter::new(File::create(path)?)))
    }
}
