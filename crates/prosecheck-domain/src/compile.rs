//! Rule file validation and compilation.
//!
//! A rule arrives as YAML text. It is validated as a raw mapping first so
//! missing/unknown `extends` and missing `message` produce stable errors,
//! then decoded into the typed spec, then compiled into one or more
//! executable checks (consistency yields one per `either` pair).

use prosecheck_types::{
    CapitalizationSpec, ConditionalSpec, ConsistencySpec, ExistenceSpec, OccurrenceSpec,
    RepetitionSpec, RuleCommon, RuleKind, RuleSpec, SubstitutionSpec, EXTENSION_POINTS,
};
use regex::Regex;
use serde_yaml::Value;

use crate::matchers::{BoundCheck, CasePredicate, CompiledCheck, Matcher, TitleStyle};
use crate::selector::Selector;

const IGNORE_CASE: &str = "(?i)";

#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("{name}: missing extension point")]
    MissingExtensionPoint { name: String },

    #[error("{name}: unknown extension point '{extends}'")]
    UnknownExtensionPoint { name: String, extends: String },

    #[error("{name}: missing message")]
    MissingMessage { name: String },

    #[error("{name}: {source}")]
    Yaml {
        name: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{name}: invalid regex '{pattern}': {source}")]
    InvalidRegex {
        name: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("{name}: no usable patterns")]
    EmptyPattern { name: String },

    #[error("{name}: max must be at least 1")]
    InvalidMax { name: String },

    #[error("{name}: duplicate check")]
    Duplicate { name: String },
}

/// The output of compiling one rule file: registry entries plus any
/// per-pattern diagnostics (e.g. skipped substitution patterns).
#[derive(Debug, Default)]
pub struct CompiledRules {
    pub checks: Vec<(String, BoundCheck)>,
    pub diagnostics: Vec<String>,
}

/// Decode a rule file into a typed spec.
///
/// `name` is the fully-qualified `Style.Rule` name derived from the file's
/// location; any `name` field inside the file is ignored. `level_override`
/// is the configured `rule_to_level` entry for this rule, if any.
pub fn parse_rule(
    yaml: &str,
    name: &str,
    level_override: Option<&str>,
) -> Result<RuleSpec, RuleError> {
    let value: Value = serde_yaml::from_str(yaml).map_err(|source| RuleError::Yaml {
        name: name.to_string(),
        source,
    })?;
    let Value::Mapping(mut map) = value else {
        return Err(RuleError::MissingExtensionPoint {
            name: name.to_string(),
        });
    };

    let extends = match map
        .get(&Value::String("extends".into()))
        .and_then(Value::as_str)
    {
        Some(e) => e.to_string(),
        None => {
            return Err(RuleError::MissingExtensionPoint {
                name: name.to_string(),
            })
        }
    };
    if !EXTENSION_POINTS.contains(&extends.as_str()) {
        return Err(RuleError::UnknownExtensionPoint {
            name: name.to_string(),
            extends,
        });
    }
    if map.get(&Value::String("message".into())).is_none() {
        return Err(RuleError::MissingMessage {
            name: name.to_string(),
        });
    }

    map.insert(
        Value::String("name".into()),
        Value::String(name.to_string()),
    );
    if let Some(level) = level_override {
        map.insert(
            Value::String("level".into()),
            Value::String(level.to_string()),
        );
    }

    let value = Value::Mapping(map);
    let yaml_err = |source| RuleError::Yaml {
        name: name.to_string(),
        source,
    };

    let common: RuleCommon = serde_yaml::from_value(value.clone()).map_err(yaml_err)?;
    let kind = match extends.as_str() {
        "existence" => {
            RuleKind::Existence(serde_yaml::from_value::<ExistenceSpec>(value).map_err(yaml_err)?)
        }
        "substitution" => RuleKind::Substitution(
            serde_yaml::from_value::<SubstitutionSpec>(value).map_err(yaml_err)?,
        ),
        "occurrence" => {
            RuleKind::Occurrence(serde_yaml::from_value::<OccurrenceSpec>(value).map_err(yaml_err)?)
        }
        "repetition" => {
            RuleKind::Repetition(serde_yaml::from_value::<RepetitionSpec>(value).map_err(yaml_err)?)
        }
        "consistency" => RuleKind::Consistency(
            serde_yaml::from_value::<ConsistencySpec>(value).map_err(yaml_err)?,
        ),
        "conditional" => RuleKind::Conditional(
            serde_yaml::from_value::<ConditionalSpec>(value).map_err(yaml_err)?,
        ),
        "capitalization" => RuleKind::Capitalization(
            serde_yaml::from_value::<CapitalizationSpec>(value).map_err(yaml_err)?,
        ),
        _ => unreachable!("extends validated above"),
    };

    Ok(RuleSpec { common, kind })
}

/// Compile a typed spec into executable checks.
pub fn compile_rule(spec: &RuleSpec) -> Result<CompiledRules, RuleError> {
    let name = spec.common.name.clone();
    let mut out = CompiledRules::default();

    match &spec.kind {
        RuleKind::Existence(def) => {
            if def.tokens.is_empty() && def.raw.is_empty() {
                return Err(RuleError::EmptyPattern { name });
            }
            let mut pattern = String::new();
            if def.ignorecase {
                pattern.push_str(IGNORE_CASE);
            }
            pattern.push_str(&def.raw.concat());
            if !def.tokens.is_empty() {
                pattern.push_str(&grouped(&def.tokens.join("|"), def.nonword));
            }
            let re = new_regex(&name, &pattern)?;
            out.checks
                .push((name.clone(), bind(spec, Matcher::Existence { re })));
        }

        RuleKind::Substitution(def) => {
            let mut tokens = String::new();
            let mut replacements = Vec::new();
            for (pattern, replacement) in &def.swap {
                // Replacements are associated with matches through
                // manually-numbered capture groups, so a pattern may only
                // contain non-capturing or escaped parens.
                let opens = pattern.matches('(').count();
                if opens != pattern.matches("?:").count() && opens != pattern.matches(r"\(").count()
                {
                    out.diagnostics.push(format!(
                        "{name}: skipped '{pattern}' (unbalanced capture groups)"
                    ));
                    continue;
                }
                if !tokens.is_empty() {
                    tokens.push('|');
                }
                tokens.push('(');
                tokens.push_str(pattern);
                tokens.push(')');
                replacements.push(replacement.clone());
            }
            if replacements.is_empty() {
                return Err(RuleError::EmptyPattern { name });
            }

            let mut pattern = String::new();
            if def.ignorecase {
                pattern.push_str(IGNORE_CASE);
            }
            pattern.push_str(&grouped(&tokens, def.nonword));
            let re = new_regex(&name, &pattern)?;
            out.checks.push((
                name.clone(),
                bind(
                    spec,
                    Matcher::Substitution {
                        re,
                        replacements,
                        pos: def.pos.clone(),
                    },
                ),
            ));
        }

        RuleKind::Occurrence(def) => {
            if def.token.is_empty() {
                return Err(RuleError::EmptyPattern { name });
            }
            if def.max < 1 {
                return Err(RuleError::InvalidMax { name });
            }
            let re = new_regex(&name, &def.token)?;
            out.checks.push((
                name.clone(),
                bind(spec, Matcher::Occurrence { re, max: def.max }),
            ));
        }

        RuleKind::Repetition(def) => {
            if def.tokens.is_empty() {
                return Err(RuleError::EmptyPattern { name });
            }
            let mut pattern = String::new();
            if def.ignorecase {
                pattern.push_str(IGNORE_CASE);
            }
            pattern.push('(');
            pattern.push_str(&def.tokens.join("|"));
            pattern.push(')');
            let re = new_regex(&name, &pattern)?;
            out.checks.push((
                name.clone(),
                bind(
                    spec,
                    Matcher::Repetition {
                        re,
                        max: def.max,
                        ignorecase: def.ignorecase,
                    },
                ),
            ));
        }

        RuleKind::Consistency(def) => {
            if def.either.is_empty() {
                return Err(RuleError::EmptyPattern { name });
            }
            let key = group_key(&name);
            let mut count = 0usize;
            for (v1, v2) in &def.either {
                count += 2;
                let g1 = format!("{key}{count}");
                let g2 = format!("{key}{}", count + 1);
                let inner = format!("(?P<{g1}>{v1})|(?P<{g2}>{v2})");

                let mut pattern = String::new();
                if def.ignorecase {
                    pattern.push_str(IGNORE_CASE);
                }
                pattern.push_str(&grouped(&inner, def.nonword));

                match new_regex(&name, &pattern) {
                    Ok(re) => out.checks.push((
                        format!("{name}.{v1}"),
                        bind(spec, Matcher::Consistency { re, pair: (g1, g2) }),
                    )),
                    Err(err) => out.diagnostics.push(err.to_string()),
                }
            }
            if out.checks.is_empty() {
                return Err(RuleError::EmptyPattern { name });
            }
        }

        RuleKind::Conditional(def) => {
            let second = new_regex(&name, &def.second)?;
            let first = new_regex(&name, &def.first)?;
            out.checks.push((
                name.clone(),
                bind(
                    spec,
                    Matcher::Conditional {
                        first,
                        second,
                        exceptions: def.exceptions.clone(),
                    },
                ),
            ));
        }

        RuleKind::Capitalization(def) => {
            if def.match_spec.is_empty() {
                return Err(RuleError::EmptyPattern { name });
            }
            let predicate = match def.match_spec.as_str() {
                "$title" => {
                    let style = match def.style.as_deref() {
                        Some("Chicago") => TitleStyle::Chicago,
                        _ => TitleStyle::Ap,
                    };
                    CasePredicate::Title(style)
                }
                "$sentence" => CasePredicate::Sentence,
                "$lower" => CasePredicate::Lower,
                "$upper" => CasePredicate::Upper,
                pattern => CasePredicate::Pattern(new_regex(&name, pattern)?),
            };
            out.checks
                .push((name.clone(), bind(spec, Matcher::Capitalization { predicate })));
        }
    }

    Ok(out)
}

fn bind(spec: &RuleSpec, matcher: Matcher) -> BoundCheck {
    BoundCheck {
        check: CompiledCheck {
            name: spec.common.name.clone(),
            extends: spec.kind.extends(),
            level: spec.common.level,
            scope: Selector::new(spec.common.scope.clone()),
            code: spec.common.code,
            link: spec.common.link.clone(),
            message: spec.common.message.clone(),
            description: spec.common.description.clone(),
        },
        matcher,
    }
}

/// Word-bounded grouping unless the rule opts out with `nonword`.
fn grouped(tokens: &str, nonword: bool) -> String {
    if nonword {
        format!("(?:{tokens})")
    } else {
        format!(r"\b(?:{tokens})\b")
    }
}

/// A regex capture-group name derived from the rule's short name.
fn group_key(name: &str) -> String {
    let short = name.split('.').nth(1).unwrap_or(name);
    let key: String = short.chars().filter(|c| c.is_alphanumeric()).collect();
    if key.is_empty() {
        "g".to_string()
    } else {
        key
    }
}

fn new_regex(name: &str, pattern: &str) -> Result<Regex, RuleError> {
    Regex::new(pattern).map_err(|source| RuleError::InvalidRegex {
        name: name.to_string(),
        pattern: pattern.to_string(),
        source,
    })
}
