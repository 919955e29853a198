//! The linter: classification, block decomposition, and dispatch.
//!
//! One `Linter` is built per run and shared read-only by every worker.
//! Prose is dispatched three times -- each sentence, each paragraph, then
//! the whole text -- so rules can target the scope they care about; line-
//! oriented content is dispatched once per line at text scope.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use globset::{Glob, GlobMatcher};
use tracing::{debug, warn};

use prosecheck_domain::{
    lint_block, Block, DirectiveIndex, DispatchSettings, FileContext, NullPosOracle, PosOracle,
    Registry,
};
use prosecheck_types::{AlertLevel, ConfigFile, Format};

use crate::code::extract_comments;
use crate::converters;
use crate::format::{classify, comment_patterns};
use crate::markup::{clean_markdown, strip_html};
use crate::sentence::Segmenter;

/// Dispatch-time settings distilled from the configuration.
#[derive(Debug, Clone)]
pub struct LintSettings {
    pub min_level: AlertLevel,
    pub base_styles: Vec<String>,
    pub global_checks: BTreeMap<String, bool>,
    pub simple: bool,
    pub sorted: bool,
    pub normalize: bool,
    pub workers: usize,
}

impl From<&ConfigFile> for LintSettings {
    fn from(config: &ConfigFile) -> Self {
        // Individually-named checks run even though their style is not a
        // base style; an explicit off still wins.
        let mut global_checks = config.global_checks.clone();
        for check in &config.checks {
            global_checks.entry(check.clone()).or_insert(true);
        }

        Self {
            min_level: config.min_alert_level,
            base_styles: config.base_styles.clone(),
            global_checks,
            simple: config.simple,
            sorted: config.sorted,
            normalize: config.normalize,
            workers: config.workers,
        }
    }
}

struct CompiledSyntax {
    matcher: GlobMatcher,
    styles: Vec<String>,
    checks: BTreeMap<String, bool>,
}

/// The shared, read-only linting engine for one run.
pub struct Linter {
    registry: Arc<Registry>,
    settings: LintSettings,
    syntax: Vec<CompiledSyntax>,
    segmenter: Segmenter,
    oracle: Arc<dyn PosOracle>,
}

impl Linter {
    /// Build a linter from a loaded registry and the run's configuration.
    ///
    /// Fails only on an invalid per-syntax glob.
    pub fn new(registry: Registry, config: &ConfigFile) -> Result<Self, globset::Error> {
        let mut syntax = Vec::with_capacity(config.syntax.len());
        for section in &config.syntax {
            syntax.push(CompiledSyntax {
                matcher: Glob::new(&section.glob)?.compile_matcher(),
                styles: section.styles.clone(),
                checks: section.checks.clone(),
            });
        }

        Ok(Self {
            registry: Arc::new(registry),
            settings: LintSettings::from(config),
            syntax,
            segmenter: Segmenter::new(),
            oracle: Arc::new(NullPosOracle),
        })
    }

    /// Swap in a real part-of-speech oracle.
    pub fn with_oracle(mut self, oracle: Arc<dyn PosOracle>) -> Self {
        self.oracle = oracle;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn settings(&self) -> &LintSettings {
        &self.settings
    }

    /// Lint one file from disk. Read and converter failures become
    /// file-level diagnostics, never errors.
    pub fn lint_file(&self, path: &Path) -> FileContext {
        let (real_ext, normed_ext, format) = classify(path);
        let mut ctx = FileContext::new(path.display().to_string(), format, real_ext, normed_ext);
        self.prepare(&mut ctx, path);

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                ctx.diagnostics
                    .push(format!("cannot read '{}': {err}", path.display()));
                return ctx;
            }
        };

        self.lint_content(ctx, &content, path)
    }

    /// Lint a string (stdin). `ext` hints at the format (default `.txt`).
    pub fn lint_string(&self, content: &str, ext: Option<&str>) -> FileContext {
        let hint = ext.unwrap_or(".txt");
        let fake = format!("stdin{hint}");
        let fake_path = Path::new(&fake);
        let (real_ext, normed_ext, format) = classify(fake_path);

        let mut ctx = FileContext::new("<stdin>", format, real_ext, normed_ext);
        self.prepare(&mut ctx, fake_path);
        self.lint_content(ctx, content, fake_path)
    }

    /// Resolve base styles and per-rule toggles for this path.
    fn prepare(&self, ctx: &mut FileContext, path: &Path) {
        ctx.base_styles = self.settings.base_styles.clone();

        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        for section in &self.syntax {
            if section.matcher.is_match(path) || section.matcher.is_match(Path::new(name)) {
                for style in &section.styles {
                    if !ctx.base_styles.contains(style) {
                        ctx.base_styles.push(style.clone());
                    }
                }
                ctx.checks.extend(
                    section
                        .checks
                        .iter()
                        .map(|(k, v)| (k.clone(), *v)),
                );
            }
        }
    }

    fn lint_content(&self, mut ctx: FileContext, content: &str, path: &Path) -> FileContext {
        ctx.directives = DirectiveIndex::scan(content);
        // Regions switched off by in-text directives are blanked before
        // extraction so no block, including the whole-text one, sees them.
        let content = &ctx.directives.mask_disabled(content);

        if self.settings.simple {
            self.lint_lines(&mut ctx, content);
            return ctx;
        }

        let normed_ext = ctx.normed_ext.clone();
        match ctx.format {
            Format::Markup => match normed_ext.as_str() {
                ".md" => {
                    let cleaned = clean_markdown(content);
                    self.lint_prose(&mut ctx, &cleaned, content, 1, 0);
                }
                ".html" => {
                    let cleaned = strip_html(content);
                    self.lint_prose(&mut ctx, &cleaned, content, 1, 0);
                }
                ".adoc" | ".rst" | ".org" => match converters::convert_to_html(path, &normed_ext) {
                    Ok(html) => {
                        let cleaned = strip_html(&html);
                        self.lint_prose(&mut ctx, &cleaned, "", 1, 0);
                    }
                    Err(err) => {
                        warn!("skipping '{}': {err}", path.display());
                        ctx.diagnostics.push(err.to_string());
                    }
                },
                _ => self.lint_lines(&mut ctx, content),
            },
            Format::Code => match comment_patterns(&normed_ext) {
                Some(patterns) => {
                    for run in extract_comments(content, &patterns) {
                        self.lint_prose(&mut ctx, &run.text, "", run.line, run.pad);
                    }
                }
                None => self.lint_lines(&mut ctx, content),
            },
            Format::Text => self.lint_lines(&mut ctx, content),
        }

        debug!(
            path = %ctx.path,
            alerts = ctx.alerts.len(),
            "file linted"
        );
        ctx
    }

    /// Dispatch prose at sentence, paragraph, and whole-text scopes.
    ///
    /// `base_line` is the 1-based line of `text`'s first character in the
    /// original file; `pad` its column offset on that line.
    fn lint_prose(
        &self,
        ctx: &mut FileContext,
        text: &str,
        raw: &str,
        base_line: usize,
        pad: usize,
    ) {
        let ext = ctx.normed_ext.clone();
        let sentence_scope = format!("sentence{ext}");
        let paragraph_scope = format!("paragraph{ext}");
        let text_scope = format!("text{ext}");

        for (offset, para) in paragraphs(text) {
            let para_line = base_line + newline_count(&text[..offset]);
            let para_pad = if para_line == base_line { pad } else { 0 };

            let mut cursor = 0;
            for sentence in self.segmenter.sentences(para) {
                let at = para[cursor..]
                    .find(sentence)
                    .map(|i| i + cursor)
                    .unwrap_or(cursor);
                cursor = at + sentence.len();

                let line = para_line + newline_count(&para[..at]);
                let line_start = para[..at].rfind('\n').map(|i| i + 1).unwrap_or(0);
                let col = (at - line_start) + if line == base_line { pad } else { 0 };

                let block = Block::new(para, sentence, "", &sentence_scope, line, col);
                self.dispatch(ctx, &block);
            }

            let block = Block::new("", para, "", &paragraph_scope, para_line, para_pad);
            self.dispatch(ctx, &block);
        }

        let block = Block::new("", text, raw, &text_scope, base_line, pad);
        self.dispatch(ctx, &block);
    }

    /// Dispatch line-oriented content, one block per line at text scope.
    fn lint_lines(&self, ctx: &mut FileContext, content: &str) {
        let scope = format!("text{}", ctx.normed_ext);
        for (i, line) in content.lines().enumerate() {
            let block = Block::new("", line, "", &scope, i + 1, 0);
            self.dispatch(ctx, &block);
        }
    }

    fn dispatch(&self, ctx: &mut FileContext, block: &Block) {
        let settings = DispatchSettings {
            min_level: self.settings.min_level,
            global_checks: &self.settings.global_checks,
        };
        lint_block(&self.registry, &settings, ctx, block, self.oracle.as_ref());
    }
}

/// Paragraphs of `text` with their byte offsets, split on blank lines.
fn paragraphs(text: &str) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    let mut start: Option<usize> = None;
    let mut pos = 0;

    for line in text.split_inclusive('\n') {
        if line.trim().is_empty() {
            if let Some(s) = start.take() {
                out.push((s, text[s..pos].trim_end()));
            }
        } else if start.is_none() {
            start = Some(pos);
        }
        pos += line.len();
    }
    if let Some(s) = start {
        out.push((s, text[s..].trim_end()));
    }
    out.retain(|(_, p)| !p.is_empty());
    out
}

fn newline_count(s: &str) -> usize {
    s.matches('\n').count()
}
