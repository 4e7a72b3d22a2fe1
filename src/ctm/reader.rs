//! Groups an externally-sorted CTM stream by utterance, then by recording.

use crate::catalog::SegmentCatalog;
use crate::ctm::record::WordHypothesis;
use crate::diagnostics::DiagnosticSink;
use crate::error::{Result, StitchError};
use std::collections::BTreeMap;
use std::io::BufRead;

/// Recording id → utterance word lists, in stream order.
///
/// A `BTreeMap` so downstream output iterates recordings in id order.
pub type HypothesisStream = BTreeMap<String, Vec<Vec<WordHypothesis>>>;

/// Read a CTM stream, grouping contiguous runs of one utterance id into
/// utterance-level word lists attached to their recordings.
///
/// The stream must already be clustered by utterance, with utterance ids
/// strictly increasing from one run to the next — the resolver relies on id
/// order tracking window order. A violation aborts the whole read; there is
/// no best-effort recovery. Intra-utterance record order is preserved
/// exactly as given.
pub fn read_hypotheses<R: BufRead>(
    reader: R,
    catalog: &SegmentCatalog,
    diag: &dyn DiagnosticSink,
) -> Result<HypothesisStream> {
    let mut stream = HypothesisStream::new();
    let mut current: Vec<WordHypothesis> = Vec::new();
    let mut num_lines = 0usize;
    let mut num_utterances = 0usize;

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.split_whitespace().next().is_none() {
            continue;
        }
        let word = WordHypothesis::parse(&line, idx + 1)?;
        num_lines += 1;

        let starts_new_utterance = match current.last() {
            Some(prev) if prev.utterance_id == word.utterance_id => false,
            Some(prev) => {
                if word.utterance_id <= prev.utterance_id {
                    return Err(StitchError::UnsortedStream {
                        previous: prev.utterance_id.clone(),
                        current: word.utterance_id.clone(),
                        message: "utterance ids must be strictly increasing".to_string(),
                    });
                }
                true
            }
            None => false,
        };
        if starts_new_utterance {
            close_utterance(&mut stream, std::mem::take(&mut current), catalog)?;
            num_utterances += 1;
        }
        current.push(word);
    }

    if !current.is_empty() {
        close_utterance(&mut stream, current, catalog)?;
        num_utterances += 1;
    }

    diag.info(&format!(
        "Read {} hypothesis lines; got {} recordings, {} utterances.",
        num_lines,
        stream.len(),
        num_utterances
    ));
    Ok(stream)
}

/// Attach a completed utterance's word list to its recording.
fn close_utterance(
    stream: &mut HypothesisStream,
    utterance: Vec<WordHypothesis>,
    catalog: &SegmentCatalog,
) -> Result<()> {
    let utterance_id = match utterance.first() {
        Some(word) => &word.utterance_id,
        None => return Ok(()),
    };
    let segment = catalog
        .get(utterance_id)
        .ok_or_else(|| StitchError::UnknownUtterance {
            utterance_id: utterance_id.clone(),
        })?;
    stream
        .entry(segment.recording_id.clone())
        .or_default()
        .push(utterance);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingSink;
    use std::io::Cursor;

    fn catalog() -> SegmentCatalog {
        SegmentCatalog::load(Cursor::new(
            "reco1-0000 reco1 0.0 30.0\n\
             reco1-0025 reco1 25.0 55.0\n\
             reco2-0000 reco2 0.0 10.0\n",
        ))
        .unwrap()
    }

    fn read_str(input: &str) -> Result<HypothesisStream> {
        read_hypotheses(Cursor::new(input), &catalog(), &CollectingSink::new())
    }

    #[test]
    fn groups_contiguous_runs_by_utterance() {
        let stream = read_str(
            "reco1-0000 1 0.5 0.2 hello 1.0\n\
             reco1-0000 1 1.0 0.3 world 0.9\n\
             reco1-0025 1 4.0 0.2 again 0.8\n",
        )
        .unwrap();

        let utts = &stream["reco1"];
        assert_eq!(utts.len(), 2);
        assert_eq!(utts[0].len(), 2);
        assert_eq!(utts[0][0].token, "hello");
        assert_eq!(utts[0][1].token, "world");
        assert_eq!(utts[1][0].token, "again");
    }

    #[test]
    fn routes_utterances_to_their_recordings() {
        let stream = read_str(
            "reco1-0000 1 0.5 0.2 one 1.0\n\
             reco2-0000 1 0.5 0.2 two 1.0\n",
        )
        .unwrap();

        assert_eq!(stream.len(), 2);
        assert_eq!(stream["reco1"][0][0].token, "one");
        assert_eq!(stream["reco2"][0][0].token, "two");
    }

    #[test]
    fn preserves_intra_utterance_order() {
        // Offsets deliberately not sorted: the reader must not reorder.
        let stream = read_str(
            "reco1-0000 1 2.0 0.2 b 1.0\n\
             reco1-0000 1 1.0 0.2 a 1.0\n",
        )
        .unwrap();
        let words = &stream["reco1"][0];
        assert_eq!(words[0].token, "b");
        assert_eq!(words[1].token, "a");
    }

    #[test]
    fn fails_on_decreasing_utterance_ids() {
        let err = read_str(
            "reco1-0025 1 0.5 0.2 later 1.0\n\
             reco1-0000 1 0.5 0.2 earlier 1.0\n",
        )
        .unwrap_err();
        match err {
            StitchError::UnsortedStream { previous, current, .. } => {
                assert_eq!(previous, "reco1-0025");
                assert_eq!(current, "reco1-0000");
            }
            other => panic!("expected UnsortedStream, got {:?}", other),
        }
    }

    #[test]
    fn fails_on_reappearing_utterance_id() {
        // Same id after another utterance closed: not contiguous, equal ids
        // break the strictly-increasing rule.
        let err = read_str(
            "reco1-0000 1 0.5 0.2 one 1.0\n\
             reco1-0025 1 0.5 0.2 two 1.0\n\
             reco1-0025 1 1.0 0.2 three 1.0\n\
             reco1-0000 1 2.0 0.2 four 1.0\n",
        )
        .unwrap_err();
        assert!(matches!(err, StitchError::UnsortedStream { .. }));
    }

    #[test]
    fn fails_on_unknown_utterance() {
        let err = read_str("reco9-0000 1 0.5 0.2 ghost 1.0\n").unwrap_err();
        match err {
            StitchError::UnknownUtterance { utterance_id } => {
                assert_eq!(utterance_id, "reco9-0000");
            }
            other => panic!("expected UnknownUtterance, got {:?}", other),
        }
    }

    #[test]
    fn fails_on_short_record() {
        let err = read_str("reco1-0000 1 0.5 0.2\n").unwrap_err();
        assert!(matches!(err, StitchError::MalformedRecord { .. }));
    }

    #[test]
    fn empty_stream_gives_empty_map() {
        let stream = read_str("").unwrap();
        assert!(stream.is_empty());
    }

    #[test]
    fn reports_counts_through_sink() {
        let sink = CollectingSink::new();
        read_hypotheses(
            Cursor::new(
                "reco1-0000 1 0.5 0.2 hello 1.0\n\
                 reco1-0025 1 4.0 0.2 again 0.8\n",
            ),
            &catalog(),
            &sink,
        )
        .unwrap();

        let messages = sink.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].1.contains("2 hypothesis lines"));
        assert!(messages[0].1.contains("2 utterances"));
    }
}
