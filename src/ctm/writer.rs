//! Renders resolved word sequences back to CTM lines.

use crate::ctm::record::WordHypothesis;
use crate::error::Result;
use std::io::Write;

/// Append one line per word to `sink`, preserving sequence order.
pub fn write_transcript<W: Write>(sink: &mut W, words: &[WordHypothesis]) -> Result<()> {
    for word in words {
        writeln!(sink, "{}", word)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(utt: &str, offset: f64, token: &str) -> WordHypothesis {
        WordHypothesis {
            utterance_id: utt.to_string(),
            channel: "1".to_string(),
            offset,
            duration: 0.25,
            token: token.to_string(),
            extra: vec!["1.0".to_string()],
        }
    }

    #[test]
    fn writes_one_line_per_word_in_order() {
        let words = vec![word("utt1", 0.5, "hello"), word("utt1", 1.0, "world")];
        let mut out = Vec::new();
        write_transcript(&mut out, &words).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "utt1 1 0.5 0.25 hello 1.0\nutt1 1 1 0.25 world 1.0\n");
    }

    #[test]
    fn empty_sequence_writes_nothing() {
        let mut out = Vec::new();
        write_transcript(&mut out, &[]).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn output_reparses_to_same_words() {
        let words = vec![word("utt1", 26.0, "alpha"), word("utt1", 29.5, "beta")];
        let mut out = Vec::new();
        write_transcript(&mut out, &words).unwrap();

        let text = String::from_utf8(out).unwrap();
        let reparsed: Vec<WordHypothesis> = text
            .lines()
            .enumerate()
            .map(|(i, line)| WordHypothesis::parse(line, i + 1).unwrap())
            .collect();
        assert_eq!(reparsed, words);
    }
}
