//! The seven extension points, compiled to executable matchers.
//!
//! Each rule kind becomes one variant of [`Matcher`]; a [`CompiledCheck`]
//! pairs the variant with the rule's common metadata and exposes a single
//! `evaluate` capability. Matchers report matches in left-to-right order
//! of occurrence.

use prosecheck_types::{Alert, AlertLevel};
use regex::Regex;

use crate::alert::make_alert;
use crate::context::FileContext;
use crate::pos::PosOracle;
use crate::selector::Selector;

/// Title-case dialect for `$title` capitalization checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleStyle {
    Chicago,
    Ap,
}

impl TitleStyle {
    /// Words left lowercase mid-title. AP additionally capitalizes any
    /// word of four or more letters, so its list is short.
    fn small_words(self) -> &'static [&'static str] {
        match self {
            TitleStyle::Chicago => &[
                "a", "an", "the", "and", "but", "or", "nor", "for", "so", "yet", "as", "at",
                "by", "in", "of", "off", "on", "per", "to", "up", "via", "with", "from", "into",
                "onto", "over", "under", "between", "through", "during", "until", "against",
                "among", "around", "toward", "towards", "upon", "within", "without",
            ],
            TitleStyle::Ap => &[
                "a", "an", "the", "and", "but", "or", "for", "nor", "as", "at", "by", "if",
                "in", "of", "off", "on", "per", "so", "to", "up", "via", "yet",
            ],
        }
    }
}

/// The predicate form of a capitalization rule's `match` field.
#[derive(Debug, Clone)]
pub enum CasePredicate {
    Lower,
    Upper,
    Sentence,
    Title(TitleStyle),
    Pattern(Regex),
}

impl CasePredicate {
    pub fn check(&self, text: &str) -> bool {
        match self {
            CasePredicate::Lower => !text.chars().any(char::is_uppercase),
            CasePredicate::Upper => !text.chars().any(char::is_lowercase),
            CasePredicate::Sentence => text
                .chars()
                .find(|c| c.is_alphabetic())
                .map_or(true, char::is_uppercase),
            CasePredicate::Title(style) => is_title_case(text, *style),
            CasePredicate::Pattern(re) => re.is_match(text),
        }
    }
}

fn is_title_case(text: &str, style: TitleStyle) -> bool {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return true;
    }
    let last = words.len() - 1;

    for (i, word) in words.iter().enumerate() {
        let clean = word.trim_matches(|c: char| !c.is_alphanumeric());
        let Some(first) = clean.chars().next() else {
            continue;
        };
        if !first.is_alphabetic() {
            continue;
        }

        // Acronyms and other all-caps words are acceptable anywhere.
        let letters = clean.chars().filter(|c| c.is_alphabetic()).count();
        if letters > 1 && !clean.chars().any(|c| c.is_lowercase()) {
            continue;
        }

        let lowered = clean.to_lowercase();
        let small = style.small_words().contains(&lowered.as_str())
            && !(style == TitleStyle::Ap && letters >= 4);
        let must_capitalize = i == 0 || i == last || !small;

        if must_capitalize {
            if !first.is_uppercase() {
                return false;
            }
        } else if first.is_uppercase() {
            return false;
        }
    }
    true
}

/// Kind-specific matching state.
#[derive(Debug, Clone)]
pub enum Matcher {
    Existence {
        re: Regex,
    },
    Substitution {
        re: Regex,
        /// Replacement for capture group `i` lives at `replacements[i - 1]`.
        replacements: Vec<String>,
        pos: Option<String>,
    },
    Occurrence {
        re: Regex,
        max: usize,
    },
    Repetition {
        re: Regex,
        max: usize,
        ignorecase: bool,
    },
    Consistency {
        re: Regex,
        /// The named capture groups standing for the two alternatives.
        pair: (String, String),
    },
    Conditional {
        first: Regex,
        second: Regex,
        exceptions: Vec<String>,
    },
    Capitalization {
        predicate: CasePredicate,
    },
}

/// A rule compiled and ready to run: common metadata plus its matcher.
#[derive(Debug, Clone)]
pub struct CompiledCheck {
    /// Fully-qualified name reported in alerts (`Style.Rule`).
    pub name: String,
    pub extends: &'static str,
    pub level: AlertLevel,
    pub scope: Selector,
    /// Run against raw (pre-cleaning) text for markup that carries code.
    pub code: bool,
    pub link: Option<String>,
    pub message: String,
    pub description: Option<String>,
}

impl CompiledCheck {
    /// The style component of the rule name.
    pub fn style(&self) -> &str {
        self.name.split('.').next().unwrap_or(&self.name)
    }

    fn alert(&self, span: (usize, usize), subs: &[&str]) -> Alert {
        make_alert(
            &self.name,
            self.level,
            span,
            self.link.as_deref(),
            &self.message,
            self.description.as_deref(),
            subs,
        )
    }
}

/// A compiled check bound to its matcher, as stored in the registry.
#[derive(Debug, Clone)]
pub struct BoundCheck {
    pub check: CompiledCheck,
    pub matcher: Matcher,
}

impl BoundCheck {
    /// Run the matcher over one block's text, reading and growing the
    /// file's sequence memory as the kind demands.
    pub fn evaluate(&self, txt: &str, ctx: &mut FileContext, oracle: &dyn PosOracle) -> Vec<Alert> {
        let chk = &self.check;
        let mut alerts = Vec::new();

        match &self.matcher {
            Matcher::Existence { re } => {
                for m in re.find_iter(txt) {
                    alerts.push(chk.alert((m.start(), m.end()), &[m.as_str()]));
                }
            }

            Matcher::Substitution {
                re,
                replacements,
                pos,
            } => {
                if !re.is_match(txt) {
                    return alerts;
                }
                for caps in re.captures_iter(txt) {
                    for idx in 1..caps.len() {
                        let Some(m) = caps.get(idx) else { continue };
                        let Some(expected) = replacements.get(idx - 1) else {
                            continue;
                        };
                        let observed = m.as_str().trim();
                        if expected == observed {
                            continue;
                        }
                        let mut alert =
                            chk.alert((m.start(), m.end()), &[expected.as_str(), observed]);
                        if let Some(pattern) = pos {
                            alert.hide = !oracle.matches((m.start(), m.end()), pattern, txt);
                        }
                        alerts.push(alert);
                    }
                }
            }

            Matcher::Occurrence { re, max } => {
                let locs: Vec<_> = re.find_iter(txt).collect();
                if locs.len() > *max {
                    let span = (locs[0].start(), locs[locs.len() - 1].end());
                    alerts.push(chk.alert(span, &[]));
                }
            }

            Matcher::Repetition {
                re,
                max,
                ignorecase,
            } => {
                let mut prev = String::new();
                let mut prev_span = (0, 0);
                let mut count = 1usize;

                for m in re.find_iter(txt) {
                    let curr = m.as_str().trim();
                    let hit = !curr.is_empty()
                        && if *ignorecase {
                            curr.eq_ignore_ascii_case(&prev)
                        } else {
                            curr == prev
                        };

                    if hit {
                        count += 1;
                    } else {
                        count = 1;
                    }
                    if hit && count > *max {
                        alerts.push(chk.alert((prev_span.0, m.end()), &[curr]));
                        count = 1;
                    }

                    prev = curr.to_string();
                    prev_span = (m.start(), m.end());
                }
            }

            Matcher::Consistency { re, pair } => {
                let mut loc = None;
                let mut matched = false;
                let names: Vec<Option<&str>> = re.capture_names().collect();

                for caps in re.captures_iter(txt) {
                    matched = true;
                    for (idx, name) in names.iter().enumerate().skip(1) {
                        let (Some(name), Some(m)) = (name, caps.get(idx)) else {
                            continue;
                        };
                        loc = Some((m.start(), m.end()));
                        ctx.sequences.push((*name).to_string());
                    }
                }

                let both_seen = ctx.sequences.iter().any(|s| s == &pair.0)
                    && ctx.sequences.iter().any(|s| s == &pair.1);
                if matched && both_seen && ctx.fired.insert(pair.0.clone()) {
                    let span = loc.unwrap_or((0, 0));
                    alerts.push(chk.alert(span, &[&txt[span.0..span.1]]));
                }
            }

            Matcher::Conditional {
                first,
                second,
                exceptions,
            } => {
                // Record every defined antecedent first: "World Health
                // Organization (WHO)" binds "WHO" for the rest of the file.
                for caps in second.captures_iter(txt) {
                    if let Some(m) = caps.get(1) {
                        ctx.sequences.push(m.as_str().to_string());
                    }
                }
                for m in first.find_iter(txt) {
                    let s = m.as_str();
                    let defined = ctx.sequences.iter().any(|seq| seq == s);
                    if !defined && !exceptions.iter().any(|e| e == s) {
                        alerts.push(chk.alert((m.start(), m.end()), &[s]));
                    }
                }
            }

            Matcher::Capitalization { predicate } => {
                if !predicate.check(txt) {
                    alerts.push(chk.alert((0, txt.len()), &[txt]));
                }
            }
        }

        alerts
    }
}
