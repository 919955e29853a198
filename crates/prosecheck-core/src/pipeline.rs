//! The file pipeline.
//!
//! Inputs are walked, filtered, and handed to a bounded worker pool, one
//! file per task. Results come back over a channel in completion order;
//! `sorted` re-orders them by path afterwards. Cancellation is
//! cooperative: the walker stops scheduling, in-flight workers finish
//! their current file.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;

use globset::Glob;
use tracing::{debug, warn};
use walkdir::WalkDir;

use prosecheck_domain::FileContext;

use crate::format::classify;
use crate::lint::Linter;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("invalid glob pattern '{pattern}': {source}")]
    InvalidGlob {
        pattern: String,
        source: globset::Error,
    },

    #[error("cannot walk '{path}': {source}")]
    Walk {
        path: String,
        source: walkdir::Error,
    },

    #[error("cannot build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// Lint every file under `inputs` matching `pattern`, with bounded
/// parallelism. The only error surfaced here is a failure to start the
/// walk (or the pool); everything per-file lands in that file's result.
pub fn lint_paths(
    linter: &Linter,
    inputs: &[PathBuf],
    pattern: &str,
    cancel: &AtomicBool,
) -> Result<Vec<FileContext>, PipelineError> {
    let glob = Glob::new(pattern)
        .map_err(|source| PipelineError::InvalidGlob {
            pattern: pattern.to_string(),
            source,
        })?
        .compile_matcher();

    let mut files = Vec::new();
    for input in inputs {
        for entry in WalkDir::new(input) {
            if cancel.load(Ordering::Relaxed) {
                break;
            }
            let entry = entry.map_err(|source| PipelineError::Walk {
                path: input.display().to_string(),
                source,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_str().unwrap_or("");
            if name.starts_with('.') || name.starts_with('_') {
                continue;
            }
            if !glob.is_match(entry.path()) && !glob.is_match(Path::new(name)) {
                continue;
            }
            files.push(entry.into_path());
        }
    }
    debug!(files = files.len(), "scheduling workers");

    let workers = linter.settings().workers.max(1);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()?;

    let (tx, rx) = mpsc::channel();
    pool.scope(|scope| {
        for path in &files {
            if cancel.load(Ordering::Relaxed) {
                break;
            }
            let tx = tx.clone();
            scope.spawn(move |_| {
                let file = catch_unwind(AssertUnwindSafe(|| linter.lint_file(path)))
                    .unwrap_or_else(|payload| poisoned_file(path, payload));
                let _ = tx.send(file);
            });
        }
    });
    drop(tx);

    let mut linted: Vec<FileContext> = rx.into_iter().collect();

    if linter.settings().normalize {
        for file in &mut linted {
            file.path = file.path.replace('\\', "/");
        }
    }
    if linter.settings().sorted {
        linted.sort_by(|a, b| a.path.cmp(&b.path));
    }
    Ok(linted)
}

/// A worker panicked (a pathological pattern, a converter bug). The file
/// reports a diagnostic; every other worker is unaffected.
fn poisoned_file(path: &Path, payload: Box<dyn std::any::Any + Send>) -> FileContext {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    warn!("worker for '{}' panicked: {detail}", path.display());

    let (real_ext, normed_ext, format) = classify(path);
    let mut ctx = FileContext::new(path.display().to_string(), format, real_ext, normed_ext);
    ctx.diagnostics
        .push(format!("internal error while linting: {detail}"));
    ctx
}

#[cfg(test)]
mod tests {
    use super::*;
    use prosecheck_domain::Registry;
    use prosecheck_types::ConfigFile;
    use std::fs;
    use tempfile::TempDir;

    const VAGUE: &str = "extends: existence\nmessage: \"'%s'\"\ntokens: [widget]";

    fn linter(sorted: bool) -> Linter {
        let mut registry = Registry::new();
        assert!(registry.load_or_report("s.R", VAGUE, None));
        let config = ConfigFile {
            base_styles: vec!["s".to_string()],
            sorted,
            ..ConfigFile::default()
        };
        Linter::new(registry, &config).expect("linter should build")
    }

    fn tree() -> TempDir {
        let td = TempDir::new().expect("temp dir");
        fs::write(td.path().join("b.txt"), "a widget\n").unwrap();
        fs::write(td.path().join("a.txt"), "no match\n").unwrap();
        fs::write(td.path().join(".hidden.txt"), "a widget\n").unwrap();
        fs::write(td.path().join("_draft.txt"), "a widget\n").unwrap();
        fs::write(td.path().join("c.log"), "a widget\n").unwrap();
        td
    }

    #[test]
    fn walks_filters_and_lints() {
        let td = tree();
        let cancel = AtomicBool::new(false);
        let linted = lint_paths(
            &linter(true),
            &[td.path().to_path_buf()],
            "*.txt",
            &cancel,
        )
        .expect("pipeline should run");

        // Hidden, underscore, and non-matching files are skipped.
        assert_eq!(linted.len(), 2);
        assert!(linted[0].path.ends_with("a.txt"));
        assert!(linted[1].path.ends_with("b.txt"));
        assert_eq!(linted[0].alerts.len(), 0);
        assert_eq!(linted[1].alerts.len(), 1);
    }

    #[test]
    fn star_glob_matches_everything_visible() {
        let td = tree();
        let cancel = AtomicBool::new(false);
        let linted =
            lint_paths(&linter(true), &[td.path().to_path_buf()], "*", &cancel).unwrap();
        assert_eq!(linted.len(), 3);
    }

    #[test]
    fn missing_root_is_the_only_hard_error() {
        let cancel = AtomicBool::new(false);
        let err = lint_paths(
            &linter(false),
            &[PathBuf::from("definitely/not/here")],
            "*",
            &cancel,
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::Walk { .. }));
    }

    #[test]
    fn invalid_glob_is_rejected() {
        let cancel = AtomicBool::new(false);
        let err = lint_paths(&linter(false), &[], "[", &cancel).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidGlob { .. }));
    }

    #[test]
    fn cancellation_stops_scheduling() {
        let td = tree();
        let cancel = AtomicBool::new(true);
        let linted =
            lint_paths(&linter(false), &[td.path().to_path_buf()], "*", &cancel).unwrap();
        assert!(linted.is_empty());
    }

    #[test]
    fn sorted_output_is_lexicographic() {
        let td = tree();
        let cancel = AtomicBool::new(false);
        let linted =
            lint_paths(&linter(true), &[td.path().to_path_buf()], "*", &cancel).unwrap();
        let mut paths: Vec<String> = linted.iter().map(|f| f.path.clone()).collect();
        let original = paths.clone();
        paths.sort();
        assert_eq!(paths, original);
    }
}
