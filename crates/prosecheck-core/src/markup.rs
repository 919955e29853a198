//! Markup cleaning.
//!
//! Rules inspect cleaned text in which code regions have been masked with
//! spaces. Masking (rather than deleting) keeps every byte offset valid in
//! the original file, so line/column reconstruction needs no offset map.

use regex::Regex;

fn mask(out: &mut String, region: &str) {
    // One space per byte, so byte offsets after the region stay exact
    // even when the masked region held multi-byte characters.
    for &b in region.as_bytes() {
        out.push(if b == b'\n' { '\n' } else { ' ' });
    }
}

/// Mask fenced code blocks and inline code spans in Markdown.
///
/// The result has exactly the same length and line structure as `src`.
pub fn clean_markdown(src: &str) -> String {
    let inline_code = Regex::new(r"`[^`\n]*`").expect("inline-code pattern should compile");

    let mut out = String::with_capacity(src.len());
    let mut in_fence = false;

    for line in src.split_inclusive('\n') {
        let trimmed = line.trim_start();
        let is_fence = trimmed.starts_with("```") || trimmed.starts_with("~~~");

        if is_fence {
            in_fence = !in_fence;
            mask(&mut out, line);
        } else if in_fence {
            mask(&mut out, line);
        } else {
            let mut last = 0;
            for m in inline_code.find_iter(line) {
                out.push_str(&line[last..m.start()]);
                mask(&mut out, m.as_str());
                last = m.end();
            }
            out.push_str(&line[last..]);
        }
    }
    out
}

/// Mask HTML tags and comments, leaving the rendered prose.
///
/// Used for `.html` input and for the HTML produced by the external
/// markup converters. Same length-preserving contract as
/// [`clean_markdown`].
pub fn strip_html(src: &str) -> String {
    let tag = Regex::new(r"(?s)<!--.*?-->|<[^>]*>").expect("tag pattern should compile");

    let mut out = String::with_capacity(src.len());
    let mut last = 0;
    for m in tag.find_iter(src) {
        out.push_str(&src[last..m.start()]);
        mask(&mut out, m.as_str());
        last = m.end();
    }
    out.push_str(&src[last..]);
    out
}
