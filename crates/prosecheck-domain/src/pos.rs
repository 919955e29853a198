//! Part-of-speech oracle seam.
//!
//! Substitution rules may carry a `pos` pattern that restricts alerts to
//! matches with a particular part of speech. Tagging itself is external;
//! the engine only needs a concurrent-read-safe yes/no answer.

/// Answers whether the text at `span` carries a POS matching `pattern`.
pub trait PosOracle: Send + Sync {
    fn matches(&self, span: (usize, usize), pattern: &str, text: &str) -> bool;
}

/// Oracle used when no tagger is wired in: accepts every match, so no
/// alert is ever hidden on POS grounds.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPosOracle;

impl PosOracle for NullPosOracle {
    fn matches(&self, _span: (usize, usize), _pattern: &str, _text: &str) -> bool {
        true
    }
}
