//! Sentence segmentation.
//!
//! Dispatch needs sentence boundaries, not linguistics: a terminal
//! punctuation mark followed by whitespace and a plausible sentence
//! opener, with a guard against common abbreviations and initials. The
//! segmenter is stateless and safe to share across workers.

#[derive(Debug, Clone)]
pub struct Segmenter {
    abbreviations: Vec<&'static str>,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self {
            abbreviations: vec![
                "e.g", "i.e", "etc", "cf", "vs", "al", "fig", "no", "dr", "mr", "mrs", "ms",
                "prof", "rev", "st", "jr", "sr", "inc", "ltd", "dept", "approx",
            ],
        }
    }
}

impl Segmenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split `text` into trimmed sentences, in order. The returned slices
    /// borrow from `text` and appear in the same order they occur.
    pub fn sentences<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut out = Vec::new();
        let mut start = 0;

        let chars: Vec<(usize, char)> = text.char_indices().collect();
        for (pos, &(i, c)) in chars.iter().enumerate() {
            if !matches!(c, '.' | '?' | '!') {
                continue;
            }
            if c == '.' && self.looks_like_abbreviation(&text[start..i]) {
                continue;
            }

            // Consume closing quotes/brackets attached to the terminator.
            let mut end = i + c.len_utf8();
            let mut next = pos + 1;
            while let Some(&(j, cc)) = chars.get(next) {
                if matches!(cc, '"' | '\'' | ')' | ']' | '\u{201d}') {
                    end = j + cc.len_utf8();
                    next += 1;
                } else {
                    break;
                }
            }

            // A boundary needs whitespace and a capital-ish opener after it.
            match chars.get(next) {
                None => {}
                Some(&(_, ws)) if ws.is_whitespace() => {
                    let opener = chars[next..]
                        .iter()
                        .map(|&(_, cc)| cc)
                        .find(|cc| !cc.is_whitespace());
                    match opener {
                        None => {}
                        Some(cc)
                            if cc.is_uppercase()
                                || cc.is_ascii_digit()
                                || matches!(cc, '"' | '\'' | '(' | '\u{201c}') => {}
                        Some(_) => continue,
                    }
                }
                Some(_) => continue,
            }

            let sentence = text[start..end].trim();
            if !sentence.is_empty() {
                out.push(sentence);
            }
            start = end;
        }

        let tail = text[start..].trim();
        if !tail.is_empty() {
            out.push(tail);
        }
        out
    }

    fn looks_like_abbreviation(&self, before: &str) -> bool {
        let word = before
            .rsplit(|c: char| c.is_whitespace())
            .next()
            .unwrap_or("");
        if word.is_empty() {
            return false;
        }

        // Single-letter initials ("J. Smith") and dotted acronyms ("U.S").
        if word.chars().filter(|c| c.is_alphabetic()).count() == 1 && word.len() <= 2 {
            return true;
        }
        if word.contains('.') {
            return true;
        }

        let lowered = word.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase();
        self.abbreviations.contains(&lowered.as_str())
    }
}
