//! In-text directive parsing.
//!
//! Directives let a document switch checks off and on inline:
//!
//! - `prosecheck off` / `prosecheck on` - disable every check from this
//!   line until re-enabled (or end of file).
//! - `prosecheck Style.Rule = NO` / `= YES` - disable or force-enable one
//!   check for the remainder of the file.
//!
//! They are usually wrapped in a comment appropriate to the format
//! (`<!-- prosecheck off -->` in markup, `// prosecheck off` in code); the
//! wrapper is irrelevant, only the payload is parsed.

use std::collections::BTreeMap;

/// A single parsed directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Disable all checks from here on.
    Off,
    /// Re-enable all checks from here on.
    On,
    /// Toggle one check (`Style.Rule`) for the whole file.
    Rule(String, bool),
}

const DIRECTIVE_PREFIX: &str = "prosecheck";

/// Parse a line for a directive. Returns `None` when the line carries none.
pub fn parse_directive(line: &str) -> Option<Directive> {
    let at = line.find(DIRECTIVE_PREFIX)?;
    let rest = line[at + DIRECTIVE_PREFIX.len()..].trim_start();

    if let Some(word) = rest.split_whitespace().next() {
        match word {
            "off" => return Some(Directive::Off),
            "on" => return Some(Directive::On),
            _ => {}
        }
    }

    // `Style.Rule = NO` form. The name must be fully qualified.
    let (name, value) = rest.split_once('=')?;
    let name = name.trim();
    if name.is_empty() || !name.contains('.') || name.contains(char::is_whitespace) {
        return None;
    }
    let value = value
        .trim()
        .trim_end_matches("-->")
        .trim_end_matches("*/")
        .trim();
    match value {
        "NO" => Some(Directive::Rule(name.to_string(), false)),
        "YES" => Some(Directive::Rule(name.to_string(), true)),
        _ => None,
    }
}

/// The directives of one file, indexed for dispatch-time queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectiveIndex {
    /// Half-open line ranges in which all checks are off. An unmatched
    /// `off` runs to the end of the file.
    windows: Vec<(usize, Option<usize>)>,
    /// Whole-file per-rule toggles.
    rules: BTreeMap<String, bool>,
}

impl DirectiveIndex {
    /// Scan a file's content, recording directives with their 1-based lines.
    pub fn scan(content: &str) -> Self {
        let mut index = Self::default();
        let mut open: Option<usize> = None;

        for (i, line) in content.lines().enumerate() {
            let lineno = i + 1;
            match parse_directive(line) {
                Some(Directive::Off) => {
                    if open.is_none() {
                        open = Some(lineno);
                    }
                }
                Some(Directive::On) => {
                    if let Some(start) = open.take() {
                        index.windows.push((start, Some(lineno)));
                    }
                }
                Some(Directive::Rule(name, enabled)) => {
                    index.rules.insert(name, enabled);
                }
                None => {}
            }
        }
        if let Some(start) = open {
            index.windows.push((start, None));
        }
        index
    }

    /// Whether `check` is disabled for a block starting at `line`.
    pub fn disabled(&self, check: &str, line: usize) -> bool {
        match self.rules.get(check) {
            Some(false) => return true,
            Some(true) => return false,
            None => {}
        }
        self.in_window(line)
    }

    fn in_window(&self, line: usize) -> bool {
        self.windows
            .iter()
            .any(|&(start, end)| line >= start && end.map_or(true, |e| line < e))
    }

    /// Space-mask the lines covered by `off` windows, preserving length
    /// and line structure. Blocks that span a window (the whole-text
    /// block always does) then never see the disabled content.
    pub fn mask_disabled(&self, content: &str) -> String {
        if self.windows.is_empty() {
            return content.to_string();
        }
        let mut out = String::with_capacity(content.len());
        for (i, line) in content.split_inclusive('\n').enumerate() {
            if self.in_window(i + 1) {
                // One space per byte keeps later byte offsets exact.
                for &b in line.as_bytes() {
                    out.push(if b == b'\n' { '\n' } else { ' ' });
                }
            } else {
                out.push_str(line);
            }
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty() && self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_off_and_on() {
        assert_eq!(parse_directive("<!-- prosecheck off -->"), Some(Directive::Off));
        assert_eq!(parse_directive("// prosecheck on"), Some(Directive::On));
        assert_eq!(parse_directive("plain prose line"), None);
    }

    #[test]
    fn parses_rule_toggle() {
        assert_eq!(
            parse_directive("<!-- prosecheck docs.Cliches = NO -->"),
            Some(Directive::Rule("docs.Cliches".to_string(), false))
        );
        assert_eq!(
            parse_directive("# prosecheck docs.Cliches = YES"),
            Some(Directive::Rule("docs.Cliches".to_string(), true))
        );
    }

    #[test]
    fn unqualified_name_is_not_a_directive() {
        assert_eq!(parse_directive("prosecheck Cliches = NO"), None);
        assert_eq!(parse_directive("prosecheck docs.Cliches = MAYBE"), None);
    }

    #[test]
    fn window_covers_until_on() {
        let idx = DirectiveIndex::scan("one\n<!-- prosecheck off -->\ntwo\n<!-- prosecheck on -->\nthree\n");
        assert!(!idx.disabled("any.Check", 1));
        assert!(idx.disabled("any.Check", 3));
        assert!(!idx.disabled("any.Check", 5));
    }

    #[test]
    fn unclosed_window_runs_to_eof() {
        let idx = DirectiveIndex::scan("<!-- prosecheck off -->\na\nb\n");
        assert!(idx.disabled("any.Check", 2));
        assert!(idx.disabled("any.Check", 999));
    }

    #[test]
    fn rule_toggle_is_whole_file() {
        let idx = DirectiveIndex::scan("text\n<!-- prosecheck docs.Cliches = NO -->\n");
        assert!(idx.disabled("docs.Cliches", 1));
        assert!(!idx.disabled("docs.Other", 1));
    }

    #[test]
    fn mask_disabled_blanks_window_lines() {
        let idx = DirectiveIndex::scan("keep\nprosecheck off\nhidden\nprosecheck on\nback\n");
        let masked = idx.mask_disabled("keep\nprosecheck off\nhidden\nprosecheck on\nback\n");
        assert_eq!(masked.len(), "keep\nprosecheck off\nhidden\nprosecheck on\nback\n".len());
        assert!(masked.contains("keep"));
        assert!(!masked.contains("hidden"));
        assert!(masked.contains("back"));
    }

    #[test]
    fn yes_overrides_an_off_window() {
        let idx = DirectiveIndex::scan("<!-- prosecheck off -->\n<!-- prosecheck docs.Keep = YES -->\n");
        assert!(idx.disabled("docs.Drop", 2));
        assert!(!idx.disabled("docs.Keep", 2));
    }
}
