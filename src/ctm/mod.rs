//! CTM record handling: parsing, stream grouping, and rendering.

pub mod reader;
pub mod record;
pub mod writer;

pub use reader::{HypothesisStream, read_hypotheses};
pub use record::WordHypothesis;
pub use writer::write_transcript;
