//! Data types (rule specs + alerts + config) for prosecheck.
//!
//! This crate is intentionally "dumb": pure DTOs with serde.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Severity of an alert, ordered from least to most severe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default, Hash,
)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Suggestion,
    #[default]
    Warning,
    Error,
}

impl AlertLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertLevel::Suggestion => "suggestion",
            AlertLevel::Warning => "warning",
            AlertLevel::Error => "error",
        }
    }

    /// Numeric form used for threshold comparisons.
    pub fn as_int(self) -> u8 {
        match self {
            AlertLevel::Suggestion => 0,
            AlertLevel::Warning => 1,
            AlertLevel::Error => 2,
        }
    }

    /// Parse a level name as it appears in rule files and config.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "suggestion" => Some(AlertLevel::Suggestion),
            "warning" => Some(AlertLevel::Warning),
            "error" => Some(AlertLevel::Error),
            _ => None,
        }
    }
}

/// Detected format of an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Markup,
    Code,
    Text,
}

impl Format {
    pub fn as_str(self) -> &'static str {
        match self {
            Format::Markup => "markup",
            Format::Code => "code",
            Format::Text => "text",
        }
    }
}

/// A single finding: one rule firing at one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    /// Fully-qualified rule name (`Style.Rule`).
    pub check: String,
    pub severity: AlertLevel,
    /// Byte offsets into the evaluated text.
    pub span: (usize, usize),
    /// 1-based line in the original file.
    pub line: usize,
    /// 1-based column in that line.
    pub column: usize,
    pub message: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub link: String,
    /// Set when a POS constraint rejected the match; hidden alerts are
    /// recorded but never rendered.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hide: bool,
}

/// Fields shared by every rule definition.
///
/// `name` is never read from the file; the loader derives it from the style
/// directory and file stem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RuleCommon {
    #[serde(default)]
    pub name: String,
    pub message: String,
    #[serde(default)]
    pub level: AlertLevel,
    #[serde(default = "default_scope")]
    pub scope: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    /// When true the rule runs on the pre-cleaning raw text of markup
    /// formats that can carry code spans.
    #[serde(default)]
    pub code: bool,
}

fn default_scope() -> String {
    "text".to_string()
}

/// Fires once per non-overlapping match of any token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ExistenceSpec {
    #[serde(default)]
    pub tokens: Vec<String>,
    /// Raw regex fragments prepended verbatim before the token template.
    #[serde(default)]
    pub raw: Vec<String>,
    #[serde(default)]
    pub ignorecase: bool,
    #[serde(default)]
    pub nonword: bool,
}

/// Fires when a matched pattern differs from its preferred replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SubstitutionSpec {
    #[serde(default)]
    pub swap: BTreeMap<String, String>,
    /// Part-of-speech pattern; when set, a non-matching POS hides the alert.
    #[serde(default)]
    pub pos: Option<String>,
    #[serde(default)]
    pub ignorecase: bool,
    #[serde(default)]
    pub nonword: bool,
}

/// Fires once per block when a pattern occurs more than `max` times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct OccurrenceSpec {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub max: usize,
}

/// Fires when the same token repeats consecutively more than `max` times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RepetitionSpec {
    #[serde(default)]
    pub tokens: Vec<String>,
    #[serde(default)]
    pub max: usize,
    #[serde(default)]
    pub ignorecase: bool,
}

/// Fires when both sides of an `either` pair occur in the same file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ConsistencySpec {
    #[serde(default)]
    pub either: BTreeMap<String, String>,
    #[serde(default)]
    pub ignorecase: bool,
    #[serde(default)]
    pub nonword: bool,
}

/// Fires when `first` matches without a prior `second` defining it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ConditionalSpec {
    #[serde(default)]
    pub first: String,
    #[serde(default)]
    pub second: String,
    #[serde(default)]
    pub exceptions: Vec<String>,
}

/// Fires when the whole block fails a case predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CapitalizationSpec {
    /// `$title`, `$sentence`, `$lower`, `$upper`, or a regular expression.
    #[serde(default, rename = "match")]
    pub match_spec: String,
    /// Title style: "Chicago" (default) or "AP".
    #[serde(default)]
    pub style: Option<String>,
}

/// A rule's kind-specific payload, discriminated by `extends`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleKind {
    Existence(ExistenceSpec),
    Substitution(SubstitutionSpec),
    Occurrence(OccurrenceSpec),
    Repetition(RepetitionSpec),
    Consistency(ConsistencySpec),
    Conditional(ConditionalSpec),
    Capitalization(CapitalizationSpec),
}

impl RuleKind {
    pub fn extends(&self) -> &'static str {
        match self {
            RuleKind::Existence(_) => "existence",
            RuleKind::Substitution(_) => "substitution",
            RuleKind::Occurrence(_) => "occurrence",
            RuleKind::Repetition(_) => "repetition",
            RuleKind::Consistency(_) => "consistency",
            RuleKind::Conditional(_) => "conditional",
            RuleKind::Capitalization(_) => "capitalization",
        }
    }
}

/// The recognized extension points, in the order they are documented.
pub const EXTENSION_POINTS: &[&str] = &[
    "existence",
    "substitution",
    "occurrence",
    "repetition",
    "consistency",
    "conditional",
    "capitalization",
];

/// A fully-decoded rule definition: common fields plus the kind payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSpec {
    pub common: RuleCommon,
    pub kind: RuleKind,
}

/// Per-syntax configuration section, keyed by an extension glob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SyntaxConfig {
    /// Extension glob this section applies to (e.g. `*.md`).
    pub glob: String,
    /// Styles active only for matching files.
    #[serde(default)]
    pub styles: Vec<String>,
    /// Per-rule on/off overrides for matching files.
    #[serde(default)]
    pub checks: BTreeMap<String, bool>,
}

/// The on-disk configuration file (`prosecheck.toml`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// Alerts below this level are not reported.
    pub min_alert_level: AlertLevel,
    /// Directory containing style subdirectories.
    pub styles_path: Option<String>,
    /// Styles active for every file.
    pub base_styles: Vec<String>,
    /// Individually-enabled rules (`Style.Rule`), loaded even when their
    /// style is not active.
    pub checks: Vec<String>,
    /// Per-rule severity overrides applied at load time.
    pub rule_to_level: BTreeMap<String, String>,
    /// Per-rule on/off overrides applied at dispatch, for every file.
    pub global_checks: BTreeMap<String, bool>,
    /// Per-syntax sections.
    pub syntax: Vec<SyntaxConfig>,
    /// Lint every file as plain lines, bypassing markup/code extraction.
    pub simple: bool,
    /// Sort finished files by path before returning them.
    pub sorted: bool,
    /// Normalize path separators to `/` in results.
    pub normalize: bool,
    /// Bound on concurrently-linted files.
    pub workers: usize,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            min_alert_level: AlertLevel::Suggestion,
            styles_path: None,
            base_styles: vec!["prosecheck".to_string()],
            checks: Vec::new(),
            rule_to_level: BTreeMap::new(),
            global_checks: BTreeMap::new(),
            syntax: Vec::new(),
            simple: false,
            sorted: false,
            normalize: false,
            workers: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_ordered() {
        assert!(AlertLevel::Suggestion < AlertLevel::Warning);
        assert!(AlertLevel::Warning < AlertLevel::Error);
        assert_eq!(AlertLevel::Error.as_int(), 2);
        assert_eq!(AlertLevel::parse("warning"), Some(AlertLevel::Warning));
        assert_eq!(AlertLevel::parse("fatal"), None);
    }

    #[test]
    fn config_defaults() {
        let cfg = ConfigFile::default();
        assert_eq!(cfg.min_alert_level, AlertLevel::Suggestion);
        assert_eq!(cfg.base_styles, vec!["prosecheck".to_string()]);
        assert_eq!(cfg.workers, 5);
        assert!(!cfg.simple);
    }

    #[test]
    fn config_parses_from_toml() {
        let cfg: ConfigFile = toml::from_str(
            r#"
min_alert_level = "error"
styles_path = "styles"
base_styles = ["prosecheck", "docs"]
checks = ["extra.Passive"]

[rule_to_level]
"prosecheck.Repetition" = "error"

[global_checks]
"docs.Cliches" = false

[[syntax]]
glob = "*.md"
styles = ["markdown"]

[syntax.checks]
"markdown.Headings" = true
"#,
        )
        .expect("config should parse");

        assert_eq!(cfg.min_alert_level, AlertLevel::Error);
        assert_eq!(cfg.styles_path.as_deref(), Some("styles"));
        assert_eq!(cfg.base_styles.len(), 2);
        assert_eq!(cfg.global_checks.get("docs.Cliches"), Some(&false));
        assert_eq!(cfg.syntax[0].glob, "*.md");
        assert_eq!(cfg.syntax[0].checks.get("markdown.Headings"), Some(&true));
    }

    #[test]
    fn existence_spec_parses_from_yaml() {
        let spec: ExistenceSpec = serde_yaml::from_str(
            r#"
tokens:
  - obviously
  - simply
ignorecase: true
"#,
        )
        .expect("spec should parse");

        assert_eq!(spec.tokens.len(), 2);
        assert!(spec.ignorecase);
        assert!(!spec.nonword);
    }
}
