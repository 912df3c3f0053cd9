//! Syntax highlighting for octohl.
//!
//! The actual tokenizing is delegated to an external highlighter; this crate
//! only defines the contract and wraps it with on-disk memoization:
//!
//! - [`Highlighter`]: Contract for external highlighters (code + language in,
//!   `<pre>`-wrapped HTML out)
//! - [`Pygments`]: [`Highlighter`] backed by the `pygmentize` executable
//! - [`CachedHighlighter`]: Consults a [`HighlightCache`](octohl_cache::HighlightCache) before calling the
//!   highlighter and stores unwrapped fragments after
//!
//! # Example
//!
//! ```no_run
//! use octohl_cache::FileCache;
//! use octohl_highlight::{CachedHighlighter, Pygments};
//!
//! let cache = FileCache::new("tmp/pygments-cache")?;
//! let highlighter = CachedHighlighter::new(Pygments::default(), cache);
//!
//! let html = highlighter.highlight("ruby", "puts \"hi\"")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod adapter;
mod pygments;

pub use adapter::{CachedHighlighter, unwrap_pre};
pub use pygments::Pygments;

use octohl_cache::CacheError;

/// External syntax highlighter.
///
/// Implementations return a self-contained HTML fragment whose highlighted
/// content sits inside a single top-level `<pre>` element (optionally wrapped
/// in further markup such as `<div class="highlight">`).
pub trait Highlighter: Send + Sync {
    /// Highlight `code` as `language`.
    ///
    /// # Errors
    ///
    /// Must return [`HighlightError::UnsupportedLanguage`] when the
    /// highlighter does not know `language`, and [`HighlightError::Failed`]
    /// for anything else that goes wrong.
    fn highlight(&self, code: &str, language: &str) -> Result<String, HighlightError>;
}

impl<H: Highlighter + ?Sized> Highlighter for &H {
    fn highlight(&self, code: &str, language: &str) -> Result<String, HighlightError> {
        (**self).highlight(code, language)
    }
}

/// Highlighting error.
#[derive(Debug, thiserror::Error)]
pub enum HighlightError {
    /// The highlighter does not recognize the language.
    #[error("unsupported language: {language}")]
    UnsupportedLanguage { language: String },
    /// The highlighter could not be run or produced unusable output.
    #[error("highlighting {language} failed: {message}")]
    Failed { language: String, message: String },
    /// The highlight cache could not be read or written.
    #[error(transparent)]
    Cache(#[from] CacheError),
}

impl HighlightError {
    pub(crate) fn failed(language: &str, message: impl Into<String>) -> Self {
        Self::Failed {
            language: language.to_owned(),
            message: message.into(),
        }
    }
}
