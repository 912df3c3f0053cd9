//! Cache-backed highlighting.
//!
//! [`CachedHighlighter`] pairs a [`Highlighter`] with a [`HighlightCache`].
//! The key is `(language, code)` only: the same snippet shown under two
//! different titles or with and without line numbers shares one entry.

use octohl_cache::{CacheKey, HighlightCache};

use crate::{HighlightError, Highlighter};

/// [`Highlighter`] wrapper that memoizes results in a [`HighlightCache`].
///
/// # Example
///
/// ```no_run
/// use octohl_cache::FileCache;
/// use octohl_highlight::{CachedHighlighter, Pygments};
///
/// let highlighter = CachedHighlighter::new(
///     Pygments::new("/usr/local/bin/pygmentize"),
///     FileCache::new("tmp/pygments-cache")?,
/// );
/// # Ok::<(), octohl_cache::CacheError>(())
/// ```
#[derive(Debug)]
pub struct CachedHighlighter<H, C> {
    highlighter: H,
    cache: C,
}

impl<H: Highlighter, C: HighlightCache> CachedHighlighter<H, C> {
    /// Wrap `highlighter` with `cache`.
    #[must_use]
    pub fn new(highlighter: H, cache: C) -> Self {
        Self { highlighter, cache }
    }

    /// Highlight `code` as `language`, returning the bare fragment.
    ///
    /// 1. On a cache hit the stored fragment is returned without calling the
    ///    highlighter.
    /// 2. On a miss the highlighter runs, its output is unwrapped with
    ///    [`unwrap_pre`], stored, and returned.
    ///
    /// Failures are never cached.
    pub fn highlight(&self, language: &str, code: &str) -> Result<String, HighlightError> {
        let key = CacheKey::new(language, code);
        if let Some(html) = self.cache.lookup(&key)? {
            return Ok(html);
        }

        let raw = self.highlighter.highlight(code, language)?;
        let fragment = unwrap_pre(&raw)
            .ok_or_else(|| HighlightError::failed(language, "no <pre> element in output"))?;

        self.cache.store(&key, &fragment)?;
        Ok(fragment)
    }

    /// The wrapped cache.
    pub fn cache(&self) -> &C {
        &self.cache
    }
}

/// Extract the content of the outermost `<pre>` element.
///
/// Everything between the first `<pre…>` start tag and the last `</pre>` is
/// kept. Trailing spaces on each line and trailing newlines are removed.
/// Returns `None` if there is no `<pre>` element.
///
/// ```
/// use octohl_highlight::unwrap_pre;
///
/// let html = "<div class=\"highlight\"><pre><span class=\"k\">def</span>  \n</pre></div>\n";
/// assert_eq!(unwrap_pre(html).as_deref(), Some("<span class=\"k\">def</span>"));
/// ```
#[must_use]
pub fn unwrap_pre(html: &str) -> Option<String> {
    let open = find_pre_open(html)?;
    let content_start = open + html[open..].find('>')? + 1;
    let content_end = html.rfind("</pre>")?;
    if content_end < content_start {
        return None;
    }

    let inner = &html[content_start..content_end];
    let stripped: Vec<&str> = inner.split('\n').map(|line| line.trim_end_matches(' ')).collect();
    Some(stripped.join("\n").trim_end_matches('\n').to_owned())
}

/// Byte offset of the first `<pre>` or `<pre …>` start tag.
fn find_pre_open(html: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(pos) = html[from..].find("<pre") {
        let at = from + pos;
        match html.as_bytes().get(at + 4) {
            Some(b'>' | b' ' | b'\t' | b'\n') => return Some(at),
            _ => from = at + 4,
        }
    }
    None
}
