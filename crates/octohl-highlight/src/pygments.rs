//! Pygments backend.
//!
//! Runs `pygmentize` as a child process, feeding the code on stdin and
//! reading the HTML formatter output from stdout.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;

use crate::{HighlightError, Highlighter};

/// Default executable name, resolved through `PATH`.
const DEFAULT_PROGRAM: &str = "pygmentize";

/// Formatter options passed with `-O`.
///
/// `startinline` lets PHP snippets highlight without a leading `<?php`.
const FORMATTER_OPTIONS: &str = "encoding=utf-8,startinline=True";

/// [`Highlighter`] that shells out to `pygmentize`.
#[derive(Debug, Clone)]
pub struct Pygments {
    program: PathBuf,
}

impl Default for Pygments {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl Pygments {
    /// Create a backend running `program` (a name on `PATH` or a path).
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, language: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(["-l", language, "-f", "html", "-O", FORMATTER_OPTIONS])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

impl Highlighter for Pygments {
    fn highlight(&self, code: &str, language: &str) -> Result<String, HighlightError> {
        tracing::debug!(language, "running {}", self.program.display());

        let mut child = self.command(language).spawn().map_err(|e| {
            HighlightError::failed(
                language,
                format!("cannot run {}: {e}", self.program.display()),
            )
        })?;

        // Write stdin on a separate thread so a large output cannot fill the
        // stdout pipe while we are still writing.
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| HighlightError::failed(language, "stdin not captured"))?;
        let output = thread::scope(|scope| {
            let writer = scope.spawn(move || stdin.write_all(code.as_bytes()));
            let output = child.wait_with_output();
            // A write error here is a broken pipe from an early exit; the exit
            // status below carries the real cause.
            let _ = writer.join();
            output
        })
        .map_err(|e| HighlightError::failed(language, e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if is_unknown_lexer(&stderr) {
                return Err(HighlightError::UnsupportedLanguage {
                    language: language.to_owned(),
                });
            }
            return Err(HighlightError::failed(
                language,
                format!(
                    "{} exited with {}: {}",
                    self.program.display(),
                    output.status,
                    stderr.trim()
                ),
            ));
        }

        String::from_utf8(output.stdout).map_err(|e| {
            HighlightError::failed(language, format!("invalid UTF-8 in output: {e}"))
        })
    }
}

/// Whether pygmentize's stderr reports an unknown lexer.
fn is_unknown_lexer(stderr: &str) -> bool {
    stderr.contains("no lexer for alias") || stderr.contains("ClassNotFound")
}
