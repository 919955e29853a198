//! Text blocks: the unit of dispatch.

use crate::selector::Selector;

/// A section of text presented to the rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Enclosing content used for reporting (a sentence's paragraph).
    pub context: String,
    /// Cleaned text the rules inspect.
    pub text: String,
    /// Pre-cleaning text, used by `code: true` rules.
    pub raw: String,
    /// Where this block sits in the document.
    pub scope: Selector,
    /// 1-based line of the block's first character in the original file.
    pub line: usize,
    /// Column offset applied to alerts on the block's first line.
    pub pad: usize,
}

impl Block {
    /// Build a block; an empty context defaults to the text itself.
    pub fn new(
        ctx: impl Into<String>,
        txt: impl Into<String>,
        raw: impl Into<String>,
        scope: impl Into<String>,
        line: usize,
        pad: usize,
    ) -> Self {
        let text = txt.into();
        let mut context = ctx.into();
        if context.is_empty() {
            context = text.clone();
        }
        Self {
            context,
            text,
            raw: raw.into(),
            scope: Selector::new(scope),
            line,
            pad,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_context_defaults_to_text() {
        let b = Block::new("", "A sentence.", "", "sentence.md", 3, 0);
        assert_eq!(b.context, "A sentence.");
        assert_eq!(b.scope, Selector::new("sentence.md"));
    }

    #[test]
    fn explicit_context_is_kept() {
        let b = Block::new("The paragraph.", "A sentence.", "", "sentence.md", 1, 0);
        assert_eq!(b.context, "The paragraph.");
    }
}
