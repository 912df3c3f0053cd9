//! Highlight cache for octohl.
//!
//! Highlighting a code block means spawning an external highlighter, which is
//! by far the slowest step of a site build. This crate memoizes the resulting
//! HTML on disk so each `(language, code)` pair is highlighted exactly once.
//!
//! - [`CacheKey`]: Content-addressed key computed from language and code
//! - [`HighlightCache`]: Lookup/store contract used by the highlighter adapter
//! - [`FileCache`]: One-file-per-entry implementation rooted at a directory
//!
//! Entries are never invalidated by this crate. Published code blocks are
//! treated as immutable; deleting the cache directory is the only way to
//! force re-highlighting.
//!
//! # Example
//!
//! ```no_run
//! use octohl_cache::{CacheKey, FileCache, HighlightCache};
//!
//! let cache = FileCache::new("tmp/pygments-cache")?;
//! let key = CacheKey::new("ruby", "puts 42");
//! if cache.lookup(&key)?.is_none() {
//!     cache.store(&key, "<span class=\"nb\">puts</span> <span class=\"mi\">42</span>")?;
//! }
//! # Ok::<(), octohl_cache::CacheError>(())
//! ```

mod file;
mod key;

use std::path::PathBuf;

pub use file::FileCache;
pub use key::CacheKey;

/// Persistent store of highlighted HTML fragments.
///
/// Implementations must tolerate concurrent use from several documents being
/// processed in parallel. Concurrent [`store`](Self::store) calls for the same
/// key may race; the value is a pure function of the key, so whichever write
/// lands last is as good as any other.
pub trait HighlightCache: Send + Sync {
    /// Retrieve the cached fragment for `key`.
    ///
    /// Returns `Ok(None)` on a cache miss. Any failure other than the entry
    /// being absent is an error.
    fn lookup(&self, key: &CacheKey) -> Result<Option<String>, CacheError>;

    /// Store `html` as the fragment for `key`, replacing any existing entry.
    fn store(&self, key: &CacheKey, html: &str) -> Result<(), CacheError>;
}

impl<C: HighlightCache + ?Sized> HighlightCache for &C {
    fn lookup(&self, key: &CacheKey) -> Result<Option<String>, CacheError> {
        (**self).lookup(key)
    }

    fn store(&self, key: &CacheKey, html: &str) -> Result<(), CacheError> {
        (**self).store(key, html)
    }
}

/// Cache error.
///
/// Every variant is fatal for a filter run: without a working cache there is
/// nowhere to persist highlighting results.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The cache directory could not be created.
    #[error("cannot create cache directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    /// An entry exists but could not be read.
    #[error("cannot read cache entry {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// An entry could not be written.
    #[error("cannot write cache entry {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}
