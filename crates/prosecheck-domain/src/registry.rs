//! The compiled-rule registry.
//!
//! Built once at startup, then shared read-only by every worker. Iteration
//! order is the map order, which keeps evaluation deterministic per run.

use std::collections::{BTreeMap, BTreeSet};

use crate::compile::{compile_rule, parse_rule, RuleError};
use crate::matchers::BoundCheck;

/// A problem encountered while loading rules. Loading continues; the
/// offending rule is simply absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadDiagnostic {
    /// Fully-qualified rule name, or a style/path for style-level errors.
    pub source: String,
    pub message: String,
}

impl std::fmt::Display for LoadDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.source, self.message)
    }
}

#[derive(Debug, Default)]
pub struct Registry {
    checks: BTreeMap<String, BoundCheck>,
    /// Base rule names that have been loaded (or attempted), for duplicate
    /// detection across styles.
    loaded: BTreeSet<String>,
    diagnostics: Vec<LoadDiagnostic>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse, compile, and register one rule file.
    ///
    /// A duplicate fully-qualified name is an error and the existing rule
    /// is retained.
    pub fn load(
        &mut self,
        name: &str,
        yaml: &str,
        level_override: Option<&str>,
    ) -> Result<(), RuleError> {
        if !self.loaded.insert(name.to_string()) {
            return Err(RuleError::Duplicate {
                name: name.to_string(),
            });
        }

        let spec = parse_rule(yaml, name, level_override)?;
        let compiled = compile_rule(&spec)?;
        for message in compiled.diagnostics {
            self.diagnostics.push(LoadDiagnostic {
                source: name.to_string(),
                message,
            });
        }
        for (key, bound) in compiled.checks {
            self.checks.insert(key, bound);
        }
        Ok(())
    }

    /// Like [`Registry::load`], but records failures as diagnostics
    /// instead of returning them. Returns whether the rule registered.
    pub fn load_or_report(
        &mut self,
        name: &str,
        yaml: &str,
        level_override: Option<&str>,
    ) -> bool {
        match self.load(name, yaml, level_override) {
            Ok(()) => true,
            Err(err) => {
                self.diagnostics.push(LoadDiagnostic {
                    source: name.to_string(),
                    message: err.to_string(),
                });
                false
            }
        }
    }

    /// Whether a style has contributed at least one rule.
    pub fn has_style(&self, style: &str) -> bool {
        let prefix = format!("{style}.");
        self.loaded.iter().any(|n| n.starts_with(&prefix))
    }

    pub fn has_rule(&self, name: &str) -> bool {
        self.loaded.contains(name)
    }

    pub fn checks(&self) -> impl Iterator<Item = (&String, &BoundCheck)> {
        self.checks.iter()
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    pub fn diagnostics(&self) -> &[LoadDiagnostic] {
        &self.diagnostics
    }

    pub fn report(&mut self, source: impl Into<String>, message: impl Into<String>) {
        self.diagnostics.push(LoadDiagnostic {
            source: source.into(),
            message: message.into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULE: &str = "extends: existence\nmessage: \"'%s' found\"\ntokens: [foo]";

    #[test]
    fn duplicate_name_is_one_error_one_rule() {
        let mut reg = Registry::new();
        assert!(reg.load_or_report("s.R", RULE, None));
        assert!(!reg.load_or_report("s.R", RULE, None));
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.diagnostics().len(), 1);
        assert!(reg.diagnostics()[0].message.contains("duplicate"));
    }

    #[test]
    fn malformed_rule_is_reported_not_fatal() {
        let mut reg = Registry::new();
        assert!(!reg.load_or_report("s.Bad", "extends: existence", None));
        assert!(reg.load_or_report("s.Good", RULE, None));
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.diagnostics().len(), 1);
    }

    #[test]
    fn style_membership_tracks_loaded_rules() {
        let mut reg = Registry::new();
        reg.load_or_report("docs.R", RULE, None);
        assert!(reg.has_style("docs"));
        assert!(!reg.has_style("other"));
        assert!(reg.has_rule("docs.R"));
        assert!(!reg.has_rule("docs.Missing"));
    }

    #[test]
    fn consistency_registers_per_pair_keys() {
        let mut reg = Registry::new();
        let yaml = "extends: consistency\nmessage: \"'%s'\"\neither:\n  color: colour";
        assert!(reg.load_or_report("docs.Spelling", yaml, None));
        assert_eq!(reg.len(), 1);
        let (key, bound) = reg.checks().next().unwrap();
        assert_eq!(key, "docs.Spelling.color");
        assert_eq!(bound.check.name, "docs.Spelling");
        // The base name is what duplicate detection sees.
        assert!(reg.has_rule("docs.Spelling"));
    }
}
