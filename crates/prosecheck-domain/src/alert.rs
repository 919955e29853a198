//! Alert assembly: message templates and span math.

use prosecheck_types::{Alert, AlertLevel};

/// Bind positional `%s` placeholders to captured strings, in order.
///
/// Extra placeholders are left in place; extra substitutions are ignored.
pub fn format_message(template: &str, subs: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut idx = 0;

    while let Some(at) = rest.find("%s") {
        out.push_str(&rest[..at]);
        if let Some(sub) = subs.get(idx) {
            out.push_str(sub);
            idx += 1;
        } else {
            out.push_str("%s");
        }
        rest = &rest[at + 2..];
    }
    out.push_str(rest);
    out
}

/// Assemble an alert for a match, formatting the message and description
/// with the given substitutions.
pub fn make_alert(
    check: &str,
    severity: AlertLevel,
    span: (usize, usize),
    link: Option<&str>,
    message: &str,
    description: Option<&str>,
    subs: &[&str],
) -> Alert {
    Alert {
        check: check.to_string(),
        severity,
        span,
        line: 0,
        column: 0,
        message: format_message(message, subs),
        description: description.map(|d| format_message(d, subs)).unwrap_or_default(),
        link: link.unwrap_or_default().to_string(),
        hide: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_in_order() {
        assert_eq!(
            format_message("Use '%s' instead of '%s'.", &["use", "utilize"]),
            "Use 'use' instead of 'utilize'."
        );
    }

    #[test]
    fn missing_subs_leave_placeholder() {
        assert_eq!(format_message("got '%s' and '%s'", &["x"]), "got 'x' and '%s'");
    }

    #[test]
    fn no_placeholders() {
        assert_eq!(format_message("plain", &["unused"]), "plain");
    }

    #[test]
    fn alert_formats_description_too() {
        let a = make_alert(
            "Style.Rule",
            AlertLevel::Warning,
            (0, 3),
            Some("https://example.com"),
            "saw '%s'",
            Some("'%s' is discouraged"),
            &["foo"],
        );
        assert_eq!(a.message, "saw 'foo'");
        assert_eq!(a.description, "'foo' is discouraged");
        assert_eq!(a.link, "https://example.com");
        assert!(!a.hide);
    }
}
