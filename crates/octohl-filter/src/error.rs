//! Filter error types.

use std::path::PathBuf;

use octohl_highlight::HighlightError;

/// Error produced while filtering a document.
///
/// Every variant aborts the document. Block-level variants carry the 1-based
/// line of the opening fence.
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    /// The options string is not a valid JSON object.
    #[error("code block at line {line}: malformed options `{options}`: {source}")]
    MalformedOptions {
        line: usize,
        options: String,
        source: serde_json::Error,
    },

    /// The document ends inside a code block.
    #[error("code block at line {line}: unterminated code block")]
    UnterminatedBlock { line: usize },

    /// Highlighting the block failed.
    #[error("code block at line {line}: {source}")]
    Highlight {
        line: usize,
        source: HighlightError,
    },

    /// Options for an included file could not be written as JSON.
    #[error("cannot encode code block options: {source}")]
    EncodeOptions { source: serde_json::Error },

    /// A file to include could not be read.
    #[error("cannot include {}: {source}", .path.display())]
    Include {
        path: PathBuf,
        source: std::io::Error,
    },
}
