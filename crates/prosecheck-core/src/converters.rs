//! External markup converters.
//!
//! AsciiDoc, reStructuredText, and Org are linted through the HTML their
//! reference converters emit. The converters are discovered on PATH; when
//! one is missing the file is skipped with a diagnostic instead of
//! aborting the run.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::warn;

/// Locate the first of `names` on PATH.
pub fn which(names: &[&str]) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path_var) {
        for name in names {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("{tool} not found on PATH")]
    NotFound { tool: &'static str },

    #[error("{tool} failed: {detail}")]
    Failed { tool: &'static str, detail: String },
}

/// Convert a markup file to HTML with the converter for its family.
///
/// Supported normed extensions: `.adoc`, `.rst`, `.org`.
pub fn convert_to_html(path: &Path, normed_ext: &str) -> Result<String, ConvertError> {
    match normed_ext {
        ".adoc" => {
            let tool = which(&["asciidoctor"]).ok_or(ConvertError::NotFound {
                tool: "asciidoctor",
            })?;
            run(&tool, &["-s", "-o", "-"], path, "asciidoctor")
        }
        ".rst" => {
            let tool = which(&["rst2html", "rst2html.py"]).ok_or(ConvertError::NotFound {
                tool: "rst2html",
            })?;
            // rst2html is a script; it needs a Python runtime to exist too.
            let runtime = which(&["python", "python3", "py"]).ok_or(ConvertError::NotFound {
                tool: "python",
            })?;
            let output = Command::new(&runtime)
                .arg(&tool)
                .arg(path)
                .output()
                .map_err(|e| ConvertError::Failed {
                    tool: "rst2html",
                    detail: e.to_string(),
                })?;
            finish(output, "rst2html")
        }
        ".org" => {
            let tool = which(&["org-ruby"]).ok_or(ConvertError::NotFound { tool: "org-ruby" })?;
            run(&tool, &["--translate", "html"], path, "org-ruby")
        }
        other => Err(ConvertError::Failed {
            tool: "converter",
            detail: format!("no converter for '{other}'"),
        }),
    }
}

fn run(
    tool: &Path,
    args: &[&str],
    input: &Path,
    name: &'static str,
) -> Result<String, ConvertError> {
    let output = Command::new(tool)
        .args(args)
        .arg(input)
        .output()
        .map_err(|e| ConvertError::Failed {
            tool: name,
            detail: e.to_string(),
        })?;
    finish(output, name)
}

fn finish(output: std::process::Output, name: &'static str) -> Result<String, ConvertError> {
    if !output.status.success() {
        let detail = String::from_utf8_lossy(&output.stderr).trim().to_string();
        warn!("{name} exited with {}: {detail}", output.status);
        return Err(ConvertError::Failed {
            tool: name,
            detail,
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
