//! Output renderers: JSON, line, and human-readable CLI.
//!
//! Hidden alerts (POS-rejected) are recorded on the file but never
//! rendered.

use std::collections::BTreeMap;

use colored::Colorize;

use prosecheck_domain::FileContext;
use prosecheck_types::{Alert, AlertLevel};

fn visible(file: &FileContext) -> impl Iterator<Item = &Alert> {
    file.alerts.iter().filter(|a| !a.hide)
}

/// A machine-readable map of path to alerts.
pub fn render_json(files: &[FileContext]) -> String {
    let map: BTreeMap<&str, Vec<&Alert>> = files
        .iter()
        .map(|f| (f.path.as_str(), visible(f).collect()))
        .collect();
    serde_json::to_string_pretty(&map).unwrap_or_else(|_| "{}".to_string())
}

/// One `path:line:column:check:message` line per alert.
pub fn render_line(files: &[FileContext]) -> String {
    let mut out = String::new();
    for file in files {
        for alert in visible(file) {
            out.push_str(&format!(
                "{}:{}:{}:{}:{}\n",
                file.path, alert.line, alert.column, alert.check, alert.message
            ));
        }
    }
    out
}

/// Grouped per-file output with a summary footer.
pub fn render_cli(files: &[FileContext]) -> String {
    let mut out = String::new();
    let (mut errors, mut warnings, mut suggestions) = (0usize, 0usize, 0usize);
    let mut touched = 0usize;

    for file in files {
        let alerts: Vec<&Alert> = visible(file).collect();
        if alerts.is_empty() && file.diagnostics.is_empty() {
            continue;
        }
        touched += 1;

        out.push_str(&format!("\n {}\n", file.path.underline()));
        for diagnostic in &file.diagnostics {
            out.push_str(&format!("  {}  {}\n", "error".red(), diagnostic));
            errors += 1;
        }
        for alert in alerts {
            let level = match alert.severity {
                AlertLevel::Error => {
                    errors += 1;
                    "error".red()
                }
                AlertLevel::Warning => {
                    warnings += 1;
                    "warning".yellow()
                }
                AlertLevel::Suggestion => {
                    suggestions += 1;
                    "suggestion".blue()
                }
            };
            out.push_str(&format!(
                "  {}:{}\t{}\t{}\t{}\n",
                alert.line,
                alert.column,
                level,
                alert.message,
                alert.check.dimmed()
            ));
        }
    }

    let glyph = if errors > 0 {
        "\u{2716}".red().to_string()
    } else {
        "\u{2714}".green().to_string()
    };
    out.push_str(&format!(
        "\n{glyph} {errors} {}, {warnings} {} and {suggestions} {} in {touched} of {} files.\n",
        plural("error", errors),
        plural("warning", warnings),
        plural("suggestion", suggestions),
        files.len()
    ));
    out
}

fn plural(word: &str, n: usize) -> String {
    if n == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prosecheck_types::Format;

    fn file_with_alerts() -> FileContext {
        let mut ctx = FileContext::new("docs/a.md", Format::Markup, ".md", ".md");
        ctx.add_alert(
            Alert {
                check: "s.R".to_string(),
                severity: AlertLevel::Error,
                span: (0, 6),
                line: 0,
                column: 0,
                message: "'widget' found".to_string(),
                description: String::new(),
                link: String::new(),
                hide: false,
            },
            3,
            0,
            "widget here",
        );
        let mut hidden = ctx.alerts[0].clone();
        hidden.check = "s.Hidden".to_string();
        hidden.hide = true;
        ctx.alerts.push(hidden);
        ctx
    }

    #[test]
    fn line_format_is_stable() {
        let files = vec![file_with_alerts()];
        assert_eq!(render_line(&files), "docs/a.md:3:1:s.R:'widget' found\n");
    }

    #[test]
    fn json_skips_hidden_alerts() {
        let files = vec![file_with_alerts()];
        let json = render_json(&files);
        assert!(json.contains("docs/a.md"));
        assert!(json.contains("s.R"));
        assert!(!json.contains("s.Hidden"));
    }

    #[test]
    fn cli_output_summarizes() {
        colored::control::set_override(false);
        let files = vec![file_with_alerts()];
        let cli = render_cli(&files);
        assert!(cli.contains("docs/a.md"));
        assert!(cli.contains("'widget' found"));
        assert!(cli.contains("1 error, 0 warnings and 0 suggestions in 1 of 1 files."));
    }

    #[test]
    fn cli_output_for_clean_run() {
        colored::control::set_override(false);
        let files = vec![FileContext::new("ok.txt", Format::Text, ".txt", ".txt")];
        let cli = render_cli(&files);
        assert!(cli.contains("0 errors, 0 warnings and 0 suggestions in 0 of 1 files."));
    }
}
