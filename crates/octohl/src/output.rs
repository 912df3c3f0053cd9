//! Status lines for the CLI.
//!
//! Everything goes to stderr: stdout carries the filtered document.

use std::error::Error;
use std::path::Path;

use console::{Style, Term};

/// Terminal output formatter.
pub(crate) struct Output {
    term: Term,
    green: Style,
    red: Style,
    dim: Style,
}

impl Output {
    /// Create a new output formatter.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            green: Style::new().green(),
            red: Style::new().red(),
            dim: Style::new().dim(),
        }
    }

    /// Print the highlight cache directory in use (dim).
    pub(crate) fn cache_dir(&self, dir: &Path) {
        let msg = format!("Highlight cache: {}", dir.display());
        let _ = self.term.write_line(&self.dim.apply_to(msg).to_string());
    }

    /// Print how many documents were rewritten in place (green).
    pub(crate) fn filtered(&self, count: usize) {
        let _ = self
            .term
            .write_line(&self.green.apply_to(filtered_message(count)).to_string());
    }

    /// Print a fatal error with its causes (red).
    pub(crate) fn error(&self, err: &dyn Error) {
        let _ = self
            .term
            .write_line(&self.red.apply_to(error_message(err)).to_string());
    }
}

fn filtered_message(count: usize) -> String {
    match count {
        1 => "Filtered 1 document".to_owned(),
        n => format!("Filtered {n} documents"),
    }
}

/// `Error: {err}`, followed by any source not already part of the message.
fn error_message(err: &dyn Error) -> String {
    let mut msg = format!("Error: {err}");
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !msg.contains(&text) {
            msg.push_str("\n  caused by: ");
            msg.push_str(&text);
        }
        source = cause.source();
    }
    msg
}
