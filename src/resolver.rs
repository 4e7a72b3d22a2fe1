//! Overlap resolution between adjacent utterance windows of one recording.
//!
//! Hypotheses are decoded per window, and consecutive windows overlap; the
//! same audio near a boundary is therefore transcribed twice. The resolver
//! splits each overlap region at its midpoint: a word belongs to whichever
//! window's center its time midpoint lies closer to. Words on the far side
//! of the split are dropped from the current window's contribution (the next
//! window covers them), and the duplicated prefix of the next window is
//! dropped in turn. Words are never split mid-token; attribution is
//! all-or-nothing per word.

use crate::catalog::{Segment, SegmentCatalog};
use crate::ctm::record::WordHypothesis;
use crate::diagnostics::DiagnosticSink;
use crate::error::{Result, StitchError};

/// Knobs for the resolver's input validation.
#[derive(Debug, Clone)]
pub struct ResolverOptions {
    /// Fail when a window's start time goes backwards even though utterance
    /// ids compare in order. Id order is an external convention standing in
    /// for chronological order; a disagreement between the two indicates an
    /// upstream data-generation bug.
    pub strict_time_order: bool,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            strict_time_order: true,
        }
    }
}

/// Resolve overlaps between consecutive utterances of one recording.
///
/// `utterances` is the recording's per-utterance word lists in stream order
/// (window-chronological, guaranteed by the reader's sort invariant).
/// Returns one flat, time-ordered, deduplicated word sequence.
///
/// Any ordering violation aborts this recording with a descriptive error;
/// the offending word lists are dumped through `diag` so the failure can be
/// diagnosed without rerunning. Other recordings are unaffected — callers
/// processing a batch should isolate failures per recording.
pub fn resolve_overlaps(
    recording_id: &str,
    mut utterances: Vec<Vec<WordHypothesis>>,
    catalog: &SegmentCatalog,
    options: &ResolverOptions,
    diag: &dyn DiagnosticSink,
) -> Result<Vec<WordHypothesis>> {
    if utterances.is_empty() {
        return Err(StitchError::EmptyRecording {
            recording_id: recording_id.to_string(),
        });
    }

    let mut output = Vec::new();
    let mut expected_id = first_utterance_id(&utterances[0])?;

    for index in 0..utterances.len() - 1 {
        let cur_id = first_utterance_id(&utterances[index])?;
        if cur_id != expected_id {
            return Err(StitchError::Internal {
                message: format!(
                    "utterance {} does not match {} carried from the previous pair",
                    cur_id, expected_id
                ),
            });
        }
        let next_id = first_utterance_id(&utterances[index + 1])?;
        if next_id <= cur_id {
            return Err(StitchError::UnsortedStream {
                previous: cur_id,
                current: next_id,
                message: format!("utterances out of order within recording {}", recording_id),
            });
        }

        let cur_seg = lookup(catalog, &cur_id)?;
        let next_seg = lookup(catalog, &next_id)?;
        if options.strict_time_order && next_seg.start < cur_seg.start {
            return Err(StitchError::UnsortedStream {
                previous: cur_id.clone(),
                current: next_id.clone(),
                message: format!(
                    "window for {} starts at {} before window for {} at {}",
                    next_id, next_seg.start, cur_id, cur_seg.start
                ),
            });
        }

        let window_length = cur_seg.window_length();
        // May be zero or negative when consecutive windows do not actually
        // overlap; may exceed window_length only in pathological input.
        let overlap = cur_seg.end - next_seg.start;

        // Break point in the current utterance: the first word whose midpoint
        // lies past the middle of the overlap region. That word and everything
        // after it is re-covered by the next window.
        let break_cur = match break_point(&utterances[index], window_length - overlap / 2.0) {
            Some(i) => i,
            None => {
                if !no_break_is_benign(&utterances[index], window_length, overlap) {
                    dump_pair(diag, recording_id, &cur_id, &utterances[index], &next_id,
                        &utterances[index + 1]);
                    return Err(StitchError::UnresolvableOverlap {
                        recording_id: recording_id.to_string(),
                        current: cur_id,
                        next: next_id,
                    });
                }
                utterances[index].len()
            }
        };

        // Break point in the next utterance: words before it duplicate the
        // current window's second half. Must exist whenever the windows
        // genuinely overlap — the next window's words span past the overlap
        // midpoint by construction.
        let break_next = match break_point(&utterances[index + 1], overlap / 2.0) {
            Some(i) => i,
            None if overlap > 0.0 => {
                dump_pair(diag, recording_id, &cur_id, &utterances[index], &next_id,
                    &utterances[index + 1]);
                return Err(StitchError::Internal {
                    message: format!(
                        "no break point in {} for overlap of {} with {}",
                        next_id, overlap, cur_id
                    ),
                });
            }
            None => 0,
        };

        let current = std::mem::take(&mut utterances[index]);
        diag.debug(&format!(
            "{}: overlap of {}s with {}; keeping {} of {} words, dropping {} duplicated from {}",
            cur_id,
            overlap,
            next_id,
            break_cur,
            current.len(),
            break_next,
            next_id
        ));
        output.extend(current.into_iter().take(break_cur));
        if break_next > 0 {
            utterances[index + 1].drain(..break_next);
        }
        expected_id = next_id;
    }

    // The last utterance (possibly already truncated) merges whole.
    if let Some(last) = utterances.pop() {
        output.extend(last);
    }
    Ok(output)
}

/// Index of the first word whose midpoint lies strictly past `threshold`.
///
/// Comparisons are strict with no epsilon: a word exactly on the boundary
/// stays with the earlier window.
fn break_point(words: &[WordHypothesis], threshold: f64) -> Option<usize> {
    words.iter().position(|w| w.midpoint() > threshold)
}

/// Whether a missing break point in the current utterance is legitimate.
///
/// With no overlap there is nothing to truncate. With a positive overlap the
/// threshold can stay uncrossed only when the last word starts before the
/// overlap region and is short enough to keep its midpoint under the split —
/// anything else (a long word straddling the break region) means the input
/// is inconsistent with the window geometry.
fn no_break_is_benign(words: &[WordHypothesis], window_length: f64, overlap: f64) -> bool {
    if overlap <= 0.0 {
        return true;
    }
    match words.last() {
        Some(last) => last.offset < window_length - overlap && last.duration <= overlap,
        None => false,
    }
}

fn first_utterance_id(words: &[WordHypothesis]) -> Result<String> {
    match words.first() {
        Some(word) => Ok(word.utterance_id.clone()),
        None => Err(StitchError::Internal {
            message: "empty utterance word list in resolver input".to_string(),
        }),
    }
}

fn lookup<'a>(catalog: &'a SegmentCatalog, utterance_id: &str) -> Result<&'a Segment> {
    catalog
        .get(utterance_id)
        .ok_or_else(|| StitchError::UnknownUtterance {
            utterance_id: utterance_id.to_string(),
        })
}

/// Dump both word lists of a failed pair for offline diagnosis.
fn dump_pair(
    diag: &dyn DiagnosticSink,
    recording_id: &str,
    cur_id: &str,
    cur: &[WordHypothesis],
    next_id: &str,
    next: &[WordHypothesis],
) {
    diag.error(&format!(
        "Could not resolve overlap between {} and {} in recording {}",
        cur_id, next_id, recording_id
    ));
    diag.error(&format!("Hypotheses for {}:", cur_id));
    for word in cur {
        diag.error(&word.render());
    }
    diag.error(&format!("Hypotheses for {}:", next_id));
    for word in next {
        diag.error(&word.render());
    }
}
