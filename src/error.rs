//! Error types for ctmstitch.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StitchError {
    // Input format errors
    #[error("Malformed record at line {line_no}: {message}: {line:?}")]
    MalformedRecord {
        line_no: usize,
        line: String,
        message: String,
    },

    #[error("Duplicate utterance id in segments: {utterance_id}")]
    DuplicateUtterance { utterance_id: String },

    #[error("Utterance {utterance_id} not found in segments")]
    UnknownUtterance { utterance_id: String },

    #[error("Hypothesis stream not sorted: {message} (previous {previous:?}, current {current:?})")]
    UnsortedStream {
        previous: String,
        current: String,
        message: String,
    },

    // Resolver errors
    #[error(
        "Could not resolve overlap between {current} and {next} in recording {recording_id}: \
         no valid break point at end of {current}"
    )]
    UnresolvableOverlap {
        recording_id: String,
        current: String,
        next: String,
    },

    #[error("No hypotheses for recording {recording_id}")]
    EmptyRecording { recording_id: String },

    // Defect class: conditions that cannot occur given valid sorted input.
    // These indicate a bug, not bad data.
    #[error("Internal invariant violated: {message}")]
    Internal { message: String },

    // Batch driver
    #[error("Failed to resolve {} recording(s): {}", failed.len(), failed.join(", "))]
    RecordingsFailed { failed: Vec<String> },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, StitchError>;
