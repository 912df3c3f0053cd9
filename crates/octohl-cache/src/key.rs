//! Cache key computation.
//!
//! Provides [`CacheKey`] for computing the content-based file name of a cache
//! entry.

use sha2::{Digest, Sha256};

/// Highlight request parameters for cache key computation.
///
/// Only the language and the exact code bytes affect highlighted output.
/// Presentation options (title, download link, line numbers) are applied
/// after highlighting and are deliberately not part of the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheKey<'a> {
    /// Highlighter language identifier (e.g. "ruby").
    pub language: &'a str,
    /// Code exactly as passed to the highlighter.
    pub code: &'a str,
}

impl<'a> CacheKey<'a> {
    /// Create a key for highlighting `code` as `language`.
    #[must_use]
    pub fn new(language: &'a str, code: &'a str) -> Self {
        Self { language, code }
    }

    /// Compute the content hash for this key.
    ///
    /// # Hash Format
    ///
    /// Hex-encoded SHA-256 of `language`, a NUL byte, then `code`. The
    /// separator keeps `("ab", "c")` and `("a", "bc")` apart.
    #[must_use]
    pub fn compute_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.language.as_bytes());
        hasher.update([0u8]);
        hasher.update(self.code.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// File name of the cache entry: `{language}-{hash}.html`.
    ///
    /// Characters of the language outside `[A-Za-z0-9_+-]` are replaced with
    /// `_` so the name is always a single path component.
    #[must_use]
    pub fn file_name(&self) -> String {
        let language: String = self
            .language
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("{language}-{}.html", self.compute_hash())
    }
}
