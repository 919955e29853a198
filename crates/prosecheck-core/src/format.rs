//! Input file classification.
//!
//! Extensions are normalized onto a small set of families so that one set
//! of comment delimiters (and one set of scope tags) covers every sibling
//! language -- all the C-family languages share `.c`, Markdown variants
//! share `.md`, and so on.

use std::path::Path;

use prosecheck_types::Format;
use regex::Regex;

/// Classify a path into (real extension, normed extension, format).
///
/// Unknown extensions fall back to plain text.
pub fn classify(path: &Path) -> (String, &'static str, Format) {
    let real_ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();

    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    // A few Ruby files are named rather than suffixed.
    if matches!(name, "Gemfile" | "Rakefile" | "Brewfile") {
        return (real_ext, ".rb", Format::Code);
    }

    let ext = real_ext.trim_start_matches('.').to_ascii_lowercase();
    let (normed, format) = match ext.as_str() {
        "py" | "py3" | "pyw" | "rpy" | "cpy" => (".py", Format::Code),
        "adoc" | "asciidoc" | "asc" => (".adoc", Format::Markup),
        "c" | "cc" | "cp" | "cpp" | "cxx" | "c++" | "h" | "hpp" | "h++" | "cs" | "csx" | "go"
        | "java" | "bsh" | "js" | "swift" | "sass" | "less" | "scala" | "sbt" => {
            (".c", Format::Code)
        }
        "css" => (".css", Format::Code),
        "html" | "htm" | "shtml" | "xhtml" => (".html", Format::Markup),
        "lua" => (".lua", Format::Code),
        "md" | "mdown" | "markdown" | "markdn" => (".md", Format::Markup),
        "org" => (".org", Format::Markup),
        "php" => (".php", Format::Code),
        "pl" | "pm" | "pod" | "r" => (".r", Format::Code),
        "rb" | "gemspec" => (".rb", Format::Code),
        "rs" => (".rs", Format::Code),
        "rst" | "rest" => (".rst", Format::Markup),
        "hs" => (".hs", Format::Code),
        _ => (".txt", Format::Text),
    };

    (real_ext, normed, format)
}

/// Comment delimiters for one normed extension.
///
/// `inline` matches a whole one-line comment; `block_start`/`block_end`
/// bracket multi-line comments. Families without block comments use a
/// never-matching pattern.
#[derive(Debug, Clone)]
pub struct CommentPatterns {
    pub inline: Regex,
    pub block_start: Regex,
    pub block_end: Regex,
}

const NEVER: &str = r"$^";

/// The lintable-region delimiters for a code family, if it has any.
pub fn comment_patterns(normed_ext: &str) -> Option<CommentPatterns> {
    let (inline, start, end) = match normed_ext {
        ".c" => (r"(//.+)|(/\*.+\*/)", r"(/\*.*)", r"(.*\*/)"),
        ".css" => (r"(/\*.+\*/)", r"(/\*.*)", r"(.*\*/)"),
        ".rs" => (r"(//.+)", NEVER, NEVER),
        ".r" => (r"(#.+)", NEVER, NEVER),
        ".py" => (
            r#"(#.*)|('{3}.+'{3})|("{3}.+"{3})"#,
            r#"(?m)^((?:\s{4,})?[r]?["']{3}.*)$"#,
            r#"(.*["']{3})"#,
        ),
        ".php" => (r"(//.+)|(/\*.+\*/)|(#.+)", r"(/\*.*)", r"(.*\*/)"),
        ".lua" => (r"(-- .+)", r"(-{2,3}\[\[.*)", r"(.*\]\])"),
        ".hs" => (r"(-- .+)", r"(\{-.*)", r"(.*-\})"),
        ".rb" => (r"(#.+)", r"(^=begin)", r"(^=end)"),
        _ => return None,
    };

    // The table is static, so these can only fail at development time.
    Some(CommentPatterns {
        inline: Regex::new(inline).expect("inline comment pattern should compile"),
        block_start: Regex::new(start).expect("block-start comment pattern should compile"),
        block_end: Regex::new(end).expect("block-end comment pattern should compile"),
    })
}
