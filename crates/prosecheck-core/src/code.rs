//! Comment extraction from source code.
//!
//! Only comments are lintable in code files. Consecutive inline comments
//! and block comments are aggregated into runs so sentences that span
//! comment lines stay intact for the prose scopes.

use crate::format::CommentPatterns;

/// A contiguous region of comment prose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentRun {
    /// The comment text, markers stripped, one line per source line.
    pub text: String,
    /// 1-based line of the run's first line.
    pub line: usize,
    /// Column offset of the text on the first line.
    pub pad: usize,
}

/// Strip comment markers and decoration from a comment region, returning
/// the offset of the surviving text and the text itself.
fn strip_marker(line: &str) -> (usize, &str) {
    let mut rest = line;
    // Ruby brackets its block comments with whole-word markers.
    for token in ["=begin", "=end"] {
        if let Some(at) = rest.find(token) {
            if rest[..at].trim().is_empty() {
                rest = &rest[at + token.len()..];
            }
        }
    }

    let trimmed = rest.trim_start_matches(|c: char| {
        c.is_whitespace()
            || matches!(c, '/' | '*' | '#' | '-' | '=' | '!' | '~' | '{' | '}' | '"' | '\'')
    });
    let off = line.len() - trimmed.len();

    let mut text = trimmed.trim_end();
    for closer in ["*/", "-}", "]]", "\"\"\"", "'''"] {
        if let Some(stripped) = text.strip_suffix(closer) {
            text = stripped.trim_end();
        }
    }
    (off, text)
}

/// Extract comment runs from `content` using the family's delimiters.
pub fn extract_comments(content: &str, patterns: &CommentPatterns) -> Vec<CommentRun> {
    let mut runs: Vec<CommentRun> = Vec::new();
    let mut in_block = false;
    let mut current: Option<CommentRun> = None;

    for (i, line) in content.lines().enumerate() {
        let lineno = i + 1;

        if in_block {
            let (region, done) = match patterns.block_end.find(line) {
                Some(m) => (&line[..m.end()], true),
                None => (line, false),
            };
            let (off, text) = strip_marker(region);
            append(&mut current, text, lineno, off);
            if done {
                in_block = false;
                runs.extend(current.take());
            }
            continue;
        }

        if let Some(m) = patterns.inline.find(line) {
            let (off, text) = strip_marker(m.as_str());
            append(&mut current, text, lineno, m.start() + off);
            continue;
        }

        if let Some(m) = patterns.block_start.find(line) {
            let (off, text) = strip_marker(&line[m.start()..]);
            in_block = true;
            append(&mut current, text, lineno, m.start() + off);
            continue;
        }

        // A non-comment line ends the current run.
        runs.extend(current.take());
    }

    runs.extend(current.take());
    runs
}

fn append(current: &mut Option<CommentRun>, text: &str, lineno: usize, pad: usize) {
    match current {
        Some(run) => {
            run.text.push('\n');
            run.text.push_str(text);
        }
        None => {
            *current = Some(CommentRun {
                text: text.to_string(),
                line: lineno,
                pad,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::comment_patterns;

    #[test]
    fn inline_comments_form_a_run() {
        let patterns = comment_patterns(".rs").unwrap();
        let src = "// First line of prose.\n// Second line.\nfn main() {}\n";
        let runs = extract_comments(src, &patterns);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].line, 1);
        assert_eq!(runs[0].text, "First line of prose.\nSecond line.");
    }

    #[test]
    fn code_breaks_runs_apart() {
        let patterns = comment_patterns(".rs").unwrap();
        let src = "// one\nlet x = 1;\n// two\n";
        let runs = extract_comments(src, &patterns);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].text, "one");
        assert_eq!(runs[1].line, 3);
    }

    #[test]
    fn trailing_comment_records_its_column() {
        let patterns = comment_patterns(".c").unwrap();
        let src = "int x = 1; // trailing note\n";
        let runs = extract_comments(src, &patterns);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text, "trailing note");
        assert_eq!(runs[0].pad, 14);
    }

    #[test]
    fn block_comments_span_lines() {
        let patterns = comment_patterns(".c").unwrap();
        let src = "/* First part\n   second part */\nint x;\n";
        let runs = extract_comments(src, &patterns);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].line, 1);
        assert_eq!(runs[0].text, "First part\nsecond part");
    }

    #[test]
    fn no_comments_yields_no_runs() {
        let patterns = comment_patterns(".rs").unwrap();
        assert!(extract_comments("fn main() {}\n", &patterns).is_empty());
    }
}
