//! A single CTM record: one hypothesized word with its timing.

use crate::error::{Result, StitchError};
use std::fmt;

/// One word-level hypothesis, timed relative to its utterance window start.
///
/// Trailing fields after the token (confidence and anything else a decoder
/// appends) are opaque and preserved verbatim, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct WordHypothesis {
    pub utterance_id: String,
    pub channel: String,
    /// Seconds from the utterance window start.
    pub offset: f64,
    /// Word duration in seconds.
    pub duration: f64,
    pub token: String,
    pub extra: Vec<String>,
}

impl WordHypothesis {
    /// Parse one CTM line: `utterance_id channel offset duration token [extra...]`.
    pub fn parse(line: &str, line_no: usize) -> Result<Self> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 5 {
            return Err(malformed(
                line_no,
                line,
                format!("expected at least 5 fields, got {}", fields.len()),
            ));
        }

        let offset = parse_seconds(fields[2], "offset", line_no, line)?;
        let duration = parse_seconds(fields[3], "duration", line_no, line)?;

        Ok(Self {
            utterance_id: fields[0].to_string(),
            channel: fields[1].to_string(),
            offset,
            duration,
            token: fields[4].to_string(),
            extra: fields[5..].iter().map(|f| f.to_string()).collect(),
        })
    }

    /// Midpoint of the word's time span, relative to the utterance window start.
    ///
    /// This is the quantity the overlap tie-break rule compares: a word is
    /// attributed to whichever window's center its midpoint lies closer to.
    pub fn midpoint(&self) -> f64 {
        self.offset + self.duration / 2.0
    }

    /// Render back to CTM line format (no trailing newline).
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for WordHypothesis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.utterance_id, self.channel, self.offset, self.duration, self.token
        )?;
        for field in &self.extra {
            write!(f, " {}", field)?;
        }
        Ok(())
    }
}

fn parse_seconds(field: &str, what: &str, line_no: usize, line: &str) -> Result<f64> {
    let value: f64 = field.parse().map_err(|_| {
        malformed(line_no, line, format!("invalid {} {:?}", what, field))
    })?;
    if !value.is_finite() || value < 0.0 {
        return Err(malformed(
            line_no,
            line,
            format!("{} must be a non-negative number, got {:?}", what, field),
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
