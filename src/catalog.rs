//! Segment catalog — utterance windows within their recordings.
//!
//! Loaded once at startup from a Kaldi-style `segments` file and immutable
//! afterwards; recording-level tasks share it read-only.

use crate::error::{Result, StitchError};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// One labeled time window of a recording.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub recording_id: String,
    /// Window start, seconds from the beginning of the recording.
    pub start: f64,
    /// Window end, seconds from the beginning of the recording.
    pub end: f64,
}

impl Segment {
    /// Window length in seconds.
    pub fn window_length(&self) -> f64 {
        self.end - self.start
    }
}

/// Mapping from utterance id to its segment.
#[derive(Debug, Clone, Default)]
pub struct SegmentCatalog {
    segments: HashMap<String, Segment>,
}

impl SegmentCatalog {
    /// Load a catalog from lines of `utterance_id recording_id start end [channel]`.
    ///
    /// The optional fifth field is accepted and ignored. Blank lines are
    /// skipped. Fails on a field count outside {4, 5}, an unparseable or
    /// inverted time pair, or a duplicate utterance id.
    pub fn load<R: BufRead>(reader: R) -> Result<Self> {
        let mut segments = HashMap::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = idx + 1;
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.is_empty() {
                continue;
            }
            if fields.len() < 4 || fields.len() > 5 {
                return Err(malformed(
                    line_no,
                    &line,
                    format!("expected 4 or 5 fields, got {}", fields.len()),
                ));
            }

            let start = parse_seconds(fields[2], "start", line_no, &line)?;
            let end = parse_seconds(fields[3], "end", line_no, &line)?;
            if end <= start {
                return Err(malformed(
                    line_no,
                    &line,
                    format!("segment end {} not after start {}", end, start),
                ));
            }

            let utterance_id = fields[0].to_string();
            let segment = Segment {
                recording_id: fields[1].to_string(),
                start,
                end,
            };
            if segments.insert(utterance_id.clone(), segment).is_some() {
                return Err(StitchError::DuplicateUtterance { utterance_id });
            }
        }

        Ok(Self { segments })
    }

    /// Load a catalog from a file on disk.
    pub fn load_path(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::load(BufReader::new(file))
    }

    pub fn get(&self, utterance_id: &str) -> Option<&Segment> {
        self.segments.get(utterance_id)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

fn parse_seconds(field: &str, what: &str, line_no: usize, line: &str) -> Result<f64> {
    let value: f64 = field.parse().map_err(|_| {
        malformed(line_no, line, format!("invalid {} time {:?}", what, field))
    })?;
    if !value.is_finite() {
        return Err(malformed(
            line_no,
            line,
            format!("non-finite {} time {:?}", what, field),
        ));
    }
    Ok(value)
}

fn malformed(line_no: usize, line: &str, message: String) -> StitchError {
    StitchError::MalformedRecord {
        line_no,
        line: line.to_string(),
        message,
    }
}
