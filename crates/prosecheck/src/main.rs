use std::io::Read;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{debug, warn};

use prosecheck_core::{
    lint_paths, load_registry, render_cli, render_json, render_line, FileContext, Linter,
};
use prosecheck_types::{AlertLevel, ConfigFile};

#[derive(Parser)]
#[command(name = "prosecheck")]
#[command(about = "Syntax-aware prose linter", long_about = None)]
#[command(version)]
struct Cli {
    /// Files or directories to lint. Reads stdin when empty.
    paths: Vec<PathBuf>,

    /// Only lint files matching this glob.
    #[arg(long, default_value = "*")]
    glob: String,

    /// Path to a config file. If omitted, uses ./prosecheck.toml if present.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Output::Cli)]
    output: Output,

    /// Minimum severity to report: suggestion, warning, or error.
    #[arg(long)]
    min_alert_level: Option<String>,

    /// Extension hint for stdin input (e.g. ".md").
    #[arg(long)]
    ext: Option<String>,

    /// Sort results by path.
    #[arg(long)]
    sort: bool,

    /// Normalize path separators to '/'.
    #[arg(long)]
    normalize: bool,

    /// Lint every file as plain lines, bypassing markup/code handling.
    #[arg(long)]
    simple: bool,

    /// Always exit 0, even when alerts are found.
    #[arg(long)]
    no_exit: bool,

    /// Enable verbose (info-level) logging to stderr.
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Enable debug-level logging to stderr.
    #[arg(long)]
    debug: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Output {
    Cli,
    Line,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.debug);

    let mut config = load_config(cli.config.clone())?;
    if let Some(level) = &cli.min_alert_level {
        config.min_alert_level = AlertLevel::parse(level)
            .with_context(|| format!("unknown alert level '{level}'"))?;
    }
    if cli.sort {
        config.sorted = true;
    }
    if cli.normalize {
        config.normalize = true;
    }
    if cli.simple {
        config.simple = true;
    }

    let registry = load_registry(&config);
    for diagnostic in registry.diagnostics() {
        warn!("{diagnostic}");
    }
    debug!(rules = registry.len(), "registry ready");

    let linter = Linter::new(registry, &config).context("compile syntax globs")?;

    let linted = if cli.paths.is_empty() {
        let mut src = String::new();
        std::io::stdin()
            .read_to_string(&mut src)
            .context("read stdin")?;
        vec![linter.lint_string(&src, cli.ext.as_deref())]
    } else {
        let cancel = AtomicBool::new(false);
        lint_paths(&linter, &cli.paths, &cli.glob, &cancel)?
    };

    for file in &linted {
        for diagnostic in &file.diagnostics {
            warn!("{}: {diagnostic}", file.path);
        }
    }

    match cli.output {
        Output::Cli => print!("{}", render_cli(&linted)),
        Output::Line => print!("{}", render_line(&linted)),
        Output::Json => println!("{}", render_json(&linted)),
    }

    let code = exit_code(&linted);
    if cli.no_exit || code == 0 {
        Ok(())
    } else {
        std::process::exit(code);
    }
}

/// 2 when an error-level alert survived, 1 for anything else the
/// dispatcher recorded (it never records alerts below the minimum),
/// else 0. Hidden alerts never count.
fn exit_code(files: &[FileContext]) -> i32 {
    let mut any = false;
    for file in files {
        for alert in file.alerts.iter().filter(|a| !a.hide) {
            if alert.severity == AlertLevel::Error {
                return 2;
            }
            any = true;
        }
    }
    i32::from(any)
}

fn init_logging(verbose: bool, debug: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config(path: Option<PathBuf>) -> Result<ConfigFile> {
    let user_path = path.or_else(|| {
        let p = PathBuf::from("prosecheck.toml");
        if p.exists() {
            Some(p)
        } else {
            None
        }
    });

    let Some(path) = user_path else {
        debug!("no config file found, using defaults");
        return Ok(ConfigFile::default());
    };

    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("read config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("parse config {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use prosecheck_types::{Alert, Format};

    fn file_with(severity: Option<AlertLevel>, hide: bool) -> FileContext {
        let mut ctx = FileContext::new("a.txt", Format::Text, ".txt", ".txt");
        if let Some(severity) = severity {
            ctx.alerts.push(Alert {
                check: "s.R".to_string(),
                severity,
                span: (0, 1),
                line: 1,
                column: 1,
                message: "m".to_string(),
                description: String::new(),
                link: String::new(),
                hide,
            });
        }
        ctx
    }

    #[test]
    fn exit_code_semantics() {
        assert_eq!(exit_code(&[file_with(None, false)]), 0);
        assert_eq!(exit_code(&[file_with(Some(AlertLevel::Suggestion), false)]), 1);
        assert_eq!(exit_code(&[file_with(Some(AlertLevel::Warning), false)]), 1);
        assert_eq!(exit_code(&[file_with(Some(AlertLevel::Error), false)]), 2);
    }

    #[test]
    fn hidden_alerts_do_not_affect_exit_code() {
        assert_eq!(exit_code(&[file_with(Some(AlertLevel::Error), true)]), 0);
    }
}
