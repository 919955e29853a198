//! Style loading.
//!
//! The registry is assembled once, before any worker starts: embedded
//! defaults first, then globally-active styles, then per-syntax styles,
//! then any individually-named checks whose style is not already loaded.
//! Duplicate names and malformed rules become load diagnostics; only a
//! corrupt embedded default is fatal.

use std::fs;
use std::path::Path;

use prosecheck_domain::Registry;
use prosecheck_types::ConfigFile;
use tracing::debug;
use walkdir::WalkDir;

/// The style name of the rules embedded in the binary.
pub const DEFAULT_STYLE: &str = "prosecheck";

const DEFAULT_RULES: &[(&str, &str)] = &[
    ("Annotations", include_str!("../rules/Annotations.yml")),
    ("Editorializing", include_str!("../rules/Editorializing.yml")),
    ("GenderBias", include_str!("../rules/GenderBias.yml")),
    ("Hedging", include_str!("../rules/Hedging.yml")),
    ("Repetition", include_str!("../rules/Repetition.yml")),
    ("Uncomparables", include_str!("../rules/Uncomparables.yml")),
];

/// Build the rule registry for this run.
pub fn load_registry(config: &ConfigFile) -> Registry {
    let mut registry = Registry::new();

    for (short, yaml) in DEFAULT_RULES {
        let name = format!("{DEFAULT_STYLE}.{short}");
        let level = config.rule_to_level.get(&name).map(String::as_str);
        if let Err(err) = registry.load(&name, yaml, level) {
            // The defaults ship inside the binary; a failure here is
            // corruption, not configuration.
            panic!("embedded default rule {name} failed to load: {err}");
        }
    }

    let Some(styles_path) = config.styles_path.as_deref() else {
        return registry;
    };
    let base = Path::new(styles_path);
    let mut loaded = vec![DEFAULT_STYLE.to_string()];

    for style in &config.base_styles {
        if style == DEFAULT_STYLE || loaded.contains(style) {
            continue;
        }
        load_style(&mut registry, config, base, style);
        loaded.push(style.clone());
    }

    for syntax in &config.syntax {
        for style in &syntax.styles {
            if !loaded.contains(style) {
                load_style(&mut registry, config, base, style);
                loaded.push(style.clone());
            }
        }
    }

    for check in &config.checks {
        // A rule must belong to a style ("Style.Rule").
        let Some((style, rule)) = check.split_once('.') else {
            continue;
        };
        if loaded.iter().any(|s| s == style) {
            continue;
        }
        let path = base.join(style).join(format!("{rule}.yml"));
        load_rule_file(&mut registry, config, &path, check);
    }

    debug!(
        rules = registry.len(),
        diagnostics = registry.diagnostics().len(),
        "registry loaded"
    );
    registry
}

fn load_style(registry: &mut Registry, config: &ConfigFile, base: &Path, style: &str) {
    let dir = base.join(style);
    if !dir.is_dir() {
        registry.report(
            style,
            format!("cannot read style directory '{}'", dir.display()),
        );
        return;
    }

    for entry in WalkDir::new(&dir).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("yml") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let name = format!("{style}.{stem}");
        load_rule_file(registry, config, path, &name);
    }
}

fn load_rule_file(registry: &mut Registry, config: &ConfigFile, path: &Path, name: &str) {
    match fs::read_to_string(path) {
        Ok(yaml) => {
            let level = config.rule_to_level.get(name).map(String::as_str);
            registry.load_or_report(name, &yaml, level);
        }
        Err(err) => {
            registry.report(name, format!("cannot read '{}': {err}", path.display()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prosecheck_types::AlertLevel;
    use tempfile::TempDir;

    const RULE: &str = "extends: existence\nmessage: \"'%s'\"\ntokens: [foo]";

    fn styles_dir() -> TempDir {
        let td = TempDir::new().expect("temp dir");
        fs::create_dir_all(td.path().join("demo")).unwrap();
        fs::write(td.path().join("demo/Foo.yml"), RULE).unwrap();
        fs::write(td.path().join("demo/Bar.yml"), RULE).unwrap();
        fs::create_dir_all(td.path().join("extra")).unwrap();
        fs::write(td.path().join("extra/Solo.yml"), RULE).unwrap();
        td
    }

    fn config(styles: &Path) -> ConfigFile {
        ConfigFile {
            styles_path: Some(styles.display().to_string()),
            ..ConfigFile::default()
        }
    }

    #[test]
    fn defaults_always_load() {
        let registry = load_registry(&ConfigFile::default());
        assert!(registry.has_rule("prosecheck.GenderBias"));
        assert!(registry.has_rule("prosecheck.Repetition"));
        assert!(registry.diagnostics().is_empty());
    }

    #[test]
    fn global_styles_load_from_disk() {
        let td = styles_dir();
        let mut cfg = config(td.path());
        cfg.base_styles.push("demo".to_string());

        let registry = load_registry(&cfg);
        assert!(registry.has_rule("demo.Foo"));
        assert!(registry.has_rule("demo.Bar"));
        assert!(!registry.has_rule("extra.Solo"));
    }

    #[test]
    fn syntax_styles_load_once() {
        let td = styles_dir();
        let mut cfg = config(td.path());
        cfg.base_styles.push("demo".to_string());
        cfg.syntax.push(prosecheck_types::SyntaxConfig {
            glob: "*.md".to_string(),
            styles: vec!["demo".to_string(), "extra".to_string()],
            checks: Default::default(),
        });

        let registry = load_registry(&cfg);
        assert!(registry.has_rule("demo.Foo"));
        assert!(registry.has_rule("extra.Solo"));
        // "demo" was already loaded globally: no duplicate diagnostics.
        assert!(registry.diagnostics().is_empty());
    }

    #[test]
    fn individual_check_loads_without_its_style() {
        let td = styles_dir();
        let mut cfg = config(td.path());
        cfg.checks.push("extra.Solo".to_string());

        let registry = load_registry(&cfg);
        assert!(registry.has_rule("extra.Solo"));
        assert!(!registry.has_style("demo"));
    }

    #[test]
    fn missing_style_directory_is_a_diagnostic() {
        let td = TempDir::new().unwrap();
        let mut cfg = config(td.path());
        cfg.base_styles.push("ghost".to_string());

        let registry = load_registry(&cfg);
        assert_eq!(registry.diagnostics().len(), 1);
        assert!(registry.diagnostics()[0].message.contains("ghost"));
    }

    #[test]
    fn rule_to_level_overrides_at_load_time() {
        let td = styles_dir();
        let mut cfg = config(td.path());
        cfg.base_styles.push("demo".to_string());
        cfg.rule_to_level
            .insert("demo.Foo".to_string(), "error".to_string());

        let registry = load_registry(&cfg);
        let foo = registry
            .checks()
            .find(|(k, _)| *k == "demo.Foo")
            .map(|(_, b)| b)
            .expect("demo.Foo should load");
        assert_eq!(foo.check.level, AlertLevel::Error);
    }
}
