//! Scope selectors.
//!
//! A selector is a dot-separated set of tags (e.g. `sentence.md`). A block
//! satisfies a rule when every tag the rule requires is present on the
//! block, with the special tag `text` implied by every block.

/// A dot-separated set of scope tags.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selector {
    pub value: String,
}

impl Selector {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// The individual tags of this selector.
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.value.split('.').filter(|s| !s.is_empty())
    }

    fn has(&self, tag: &str) -> bool {
        // `text` is the root scope: every block is, at minimum, text.
        tag == "text" || self.sections().any(|s| s == tag)
    }

    /// Whether this block scope satisfies the given rule scope.
    ///
    /// Pure set containment: an empty rule scope matches everything, and
    /// there is no precedence beyond inclusion.
    pub fn contains(&self, rule: &Selector) -> bool {
        rule.sections().all(|tag| self.has(tag))
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match() {
        let block = Selector::new("sentence.md");
        assert!(block.contains(&Selector::new("sentence.md")));
        assert!(block.contains(&Selector::new("sentence")));
        assert!(block.contains(&Selector::new("md")));
    }

    #[test]
    fn text_is_implied_by_every_block() {
        for scope in ["sentence.md", "paragraph.rst", "text.c", "text"] {
            assert!(Selector::new(scope).contains(&Selector::new("text")));
        }
    }

    #[test]
    fn missing_tag_does_not_match() {
        let block = Selector::new("text.md");
        assert!(!block.contains(&Selector::new("sentence")));
        assert!(!block.contains(&Selector::new("sentence.md")));
        assert!(!block.contains(&Selector::new("text.rst")));
    }

    #[test]
    fn empty_rule_scope_matches_anything() {
        assert!(Selector::new("paragraph.adoc").contains(&Selector::new("")));
        assert!(Selector::new("").contains(&Selector::new("")));
    }
}
