//! Pluggable diagnostic reporting.
//!
//! The reader, resolver, and batch driver report progress and failure
//! context through a passed-in sink instead of process-wide logging state,
//! so library users decide where diagnostics go.

use owo_colors::OwoColorize;
use std::io::IsTerminal;

/// Destination for progress and failure diagnostics.
pub trait DiagnosticSink: Send + Sync {
    /// Progress information (line counts, per-recording summaries).
    fn info(&self, message: &str);

    /// Per-pair resolution detail, shown only in verbose mode.
    fn debug(&self, message: &str);

    /// Failure context (offending utterance pairs, dumped word lists).
    fn error(&self, message: &str);
}

/// Default sink — writes to stderr, coloring errors on a terminal.
/// Debug detail is printed only when constructed with a nonzero verbosity.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrSink {
    verbosity: u8,
}

impl StderrSink {
    pub fn new(verbosity: u8) -> Self {
        Self { verbosity }
    }
}

impl DiagnosticSink for StderrSink {
    fn info(&self, message: &str) {
        eprintln!("{}", message);
    }

    fn debug(&self, message: &str) {
        if self.verbosity > 0 {
            eprintln!("{}", message);
        }
    }

    fn error(&self, message: &str) {
        if std::io::stderr().is_terminal() {
            eprintln!("{} {}", "error:".red().bold(), message);
        } else {
            eprintln!("error: {}", message);
        }
    }
}

/// Quiet-mode sink — discards info, keeps errors on stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSink;

impl DiagnosticSink for SilentSink {
    fn info(&self, _message: &str) {}

    fn debug(&self, _message: &str) {}

    fn error(&self, message: &str) {
        eprintln!("error: {}", message);
    }
}

/// Collects messages in memory for assertions.
#[derive(Debug, Default)]
pub struct CollectingSink {
    messages: std::sync::Mutex<Vec<(Level, String)>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Debug,
    Error,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All collected messages, in arrival order.
    pub fn messages(&self) -> Vec<(Level, String)> {
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Collected error messages only.
    pub fn errors(&self) -> Vec<String> {
        self.at_level(Level::Error)
    }

    /// Collected debug messages only.
    pub fn debugs(&self) -> Vec<String> {
        self.at_level(Level::Debug)
    }

    fn at_level(&self, wanted: Level) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|(level, _)| *level == wanted)
            .map(|(_, msg)| msg)
            .collect()
    }
}

impl DiagnosticSink for CollectingSink {
    fn info(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((Level::Info, message.to_string()));
    }

    fn debug(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((Level::Debug, message.to_string()));
    }

    fn error(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((Level::Error, message.to_string()));
    }
}
