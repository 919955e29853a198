//! Orchestration layer: turns paths into linted files.
//!
//! Styles are loaded from disk into the domain registry, input files are
//! classified and decomposed into blocks, and a bounded worker pool lints
//! one file per task.

pub mod code;
pub mod converters;
pub mod format;
pub mod lint;
pub mod loader;
pub mod markup;
pub mod pipeline;
pub mod render;
pub mod sentence;

pub use prosecheck_domain::{FileContext, Registry};

pub use format::{classify, comment_patterns, CommentPatterns};
pub use lint::{Linter, LintSettings};
pub use loader::{load_registry, DEFAULT_STYLE};
pub use pipeline::{lint_paths, PipelineError};
pub use render::{render_cli, render_json, render_line};
pub use sentence::Segmenter;
