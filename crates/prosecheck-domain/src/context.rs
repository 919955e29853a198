//! Per-file mutable state threaded through rule evaluation.

use std::collections::{BTreeMap, BTreeSet};

use prosecheck_types::{Alert, Format};

use crate::directives::DirectiveIndex;

/// Everything one worker accumulates while linting a single file.
///
/// Never shared: each file is owned by exactly one worker, so the sequence
/// memory and alert list need no synchronization.
#[derive(Debug, Clone)]
pub struct FileContext {
    pub path: String,
    pub format: Format,
    /// The file's own extension (`.markdown`).
    pub real_ext: String,
    /// The family the extension is normalized to (`.md`).
    pub normed_ext: String,
    /// Alerts in (block order, rule order).
    pub alerts: Vec<Alert>,
    /// Substrings captured by consistency/conditional rules in earlier
    /// blocks of this file. Grows monotonically.
    pub sequences: Vec<String>,
    /// Consistency pairs that have already fired for this file.
    pub fired: BTreeSet<String>,
    /// Per-syntax rule toggles from configuration.
    pub checks: BTreeMap<String, bool>,
    /// Styles whose rules run implicitly for this file.
    pub base_styles: Vec<String>,
    /// In-text directives scanned from the content.
    pub directives: DirectiveIndex,
    /// File-level problems (read failures, converter failures, panics).
    pub diagnostics: Vec<String>,
}

impl FileContext {
    pub fn new(
        path: impl Into<String>,
        format: Format,
        real_ext: impl Into<String>,
        normed_ext: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            format,
            real_ext: real_ext.into(),
            normed_ext: normed_ext.into(),
            alerts: Vec::new(),
            sequences: Vec::new(),
            fired: BTreeSet::new(),
            checks: BTreeMap::new(),
            base_styles: Vec::new(),
            directives: DirectiveIndex::default(),
            diagnostics: Vec::new(),
        }
    }

    /// Attach file coordinates to an alert and record it.
    ///
    /// `line` is the 1-based first line of the evaluated text, `pad` the
    /// column offset of its first line, and `txt` the evaluated text the
    /// alert's span indexes into. An alert whose (check, line, column)
    /// triple is already recorded is dropped: the same occurrence is seen
    /// again when a sentence block is re-dispatched at paragraph and text
    /// scope.
    pub fn add_alert(&mut self, mut alert: Alert, line: usize, pad: usize, txt: &str) {
        let start = alert.span.0.min(txt.len());
        let prefix = &txt[..start];
        let newlines = prefix.matches('\n').count();
        let line_start = prefix.rfind('\n').map(|i| i + 1).unwrap_or(0);

        alert.line = line + newlines;
        alert.column = start - line_start + 1 + if newlines == 0 { pad } else { 0 };

        let duplicate = self.alerts.iter().any(|a| {
            a.check == alert.check && a.line == alert.line && a.column == alert.column
        });
        if !duplicate {
            self.alerts.push(alert);
        }
    }

    /// Number of visible alerts at or above `min`.
    pub fn alert_count(&self, min: prosecheck_types::AlertLevel) -> usize {
        self.alerts
            .iter()
            .filter(|a| !a.hide && a.severity >= min)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prosecheck_types::AlertLevel;

    fn alert(check: &str, span: (usize, usize)) -> Alert {
        Alert {
            check: check.to_string(),
            severity: AlertLevel::Warning,
            span,
            line: 0,
            column: 0,
            message: "m".to_string(),
            description: String::new(),
            link: String::new(),
            hide: false,
        }
    }

    fn ctx() -> FileContext {
        FileContext::new("doc.md", Format::Markup, ".md", ".md")
    }

    #[test]
    fn line_and_column_from_span() {
        let mut f = ctx();
        f.add_alert(alert("a.B", (10, 14)), 5, 0, "first line\nnext line");
        assert_eq!(f.alerts[0].line, 6);
        assert_eq!(f.alerts[0].column, 1);
    }

    #[test]
    fn pad_applies_only_to_first_line() {
        let mut f = ctx();
        f.add_alert(alert("a.B", (4, 6)), 2, 3, "abcdef\nghi");
        assert_eq!(f.alerts[0].line, 2);
        assert_eq!(f.alerts[0].column, 8);

        f.add_alert(alert("a.C", (9, 10)), 2, 3, "abcdef\nghi");
        assert_eq!(f.alerts[1].line, 3);
        assert_eq!(f.alerts[1].column, 3);
    }

    #[test]
    fn duplicate_position_is_dropped() {
        let mut f = ctx();
        f.add_alert(alert("a.B", (0, 4)), 1, 0, "word here");
        f.add_alert(alert("a.B", (0, 4)), 1, 0, "word here and more context");
        assert_eq!(f.alerts.len(), 1);

        // A different check at the same spot still lands.
        f.add_alert(alert("a.C", (0, 4)), 1, 0, "word here");
        assert_eq!(f.alerts.len(), 2);
    }

    #[test]
    fn visible_alert_count_skips_hidden() {
        let mut f = ctx();
        f.add_alert(alert("a.B", (0, 1)), 1, 0, "x");
        let mut hidden = alert("a.C", (0, 1));
        hidden.hide = true;
        f.add_alert(hidden, 1, 0, "x");
        assert_eq!(f.alert_count(AlertLevel::Suggestion), 1);
        assert_eq!(f.alert_count(AlertLevel::Error), 0);
    }
}
