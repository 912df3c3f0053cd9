//! File-based cache implementation.
//!
//! [`FileCache`] stores each entry as a plain HTML file named after its
//! [`CacheKey`]:
//!
//! ```text
//! {root}/
//! +-- ruby-3f0a…e1.html
//! +-- javascript-9b2c…07.html
//! ```
//!
//! A lookup is a single `open` of the entry path; there is no index and no
//! directory scan. Writes go to a temporary file in the same directory that
//! is then renamed over the entry, so readers never observe a partial entry.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::{CacheError, CacheKey, HighlightCache};

/// File-based [`HighlightCache`] rooted at a directory on disk.
#[derive(Debug)]
pub struct FileCache {
    root: PathBuf,
}

impl FileCache {
    /// Open the cache at `root`, creating the directory and its parents.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::CreateDir`] if the directory cannot be created.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let root = root.into();
        if !root.is_dir() {
            fs::create_dir_all(&root).map_err(|source| CacheError::CreateDir {
                path: root.clone(),
                source,
            })?;
            tracing::info!("created highlight cache at {}", root.display());
        }
        Ok(Self { root })
    }

    /// Cache root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the entry file for `key`.
    #[must_use]
    pub fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.root.join(key.file_name())
    }
}

impl HighlightCache for FileCache {
    fn lookup(&self, key: &CacheKey) -> Result<Option<String>, CacheError> {
        let path = self.entry_path(key);
        match fs::read_to_string(&path) {
            Ok(html) => {
                tracing::debug!(language = key.language, "cache hit: {}", path.display());
                Ok(Some(html))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(language = key.language, "cache miss: {}", path.display());
                Ok(None)
            }
            Err(source) => Err(CacheError::Read { path, source }),
        }
    }

    fn store(&self, key: &CacheKey, html: &str) -> Result<(), CacheError> {
        let path = self.entry_path(key);
        let write_err = |source| CacheError::Write {
            path: path.clone(),
            source,
        };

        let mut tmp = NamedTempFile::new_in(&self.root).map_err(write_err)?;
        tmp.write_all(html.as_bytes()).map_err(write_err)?;
        tmp.persist(&path).map_err(|e| write_err(e.error))?;

        tracing::debug!(language = key.language, "cached {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    #[test]
    fn test_store_and_lookup() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path().join("cache")).unwrap();
        let key = CacheKey::new("ruby", "puts 1");

        cache.store(&key, "<span>puts</span> 1").unwrap();

        assert_eq!(
            cache.lookup(&key).unwrap(),
            Some("<span>puts</span> 1".to_owned())
        );
    }

    #[test]
    fn test_lookup_missing_entry() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path()).unwrap();

        assert_eq!(cache.lookup(&CacheKey::new("ruby", "nope")).unwrap(), None);
    }

    #[test]
    fn test_language_isolates_entries() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path()).unwrap();
        let ruby = CacheKey::new("ruby", "x = 1");
        let python = CacheKey::new("python", "x = 1");

        cache.store(&ruby, "ruby-html").unwrap();

        assert_eq!(cache.lookup(&ruby).unwrap(), Some("ruby-html".to_owned()));
        assert_eq!(cache.lookup(&python).unwrap(), None);
    }

    #[test]
    fn test_store_overwrites() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path()).unwrap();
        let key = CacheKey::new("c", "int x;");

        cache.store(&key, "first").unwrap();
        cache.store(&key, "second").unwrap();

        assert_eq!(cache.lookup(&key).unwrap(), Some("second".to_owned()));
    }

    #[test]
    fn test_entry_is_plain_html_file() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path()).unwrap();
        let key = CacheKey::new("ruby", "puts 1");

        cache.store(&key, "<b>x</b>").unwrap();

        let path = cache.entry_path(&key);
        assert_eq!(path.parent(), Some(tmp.path()));
        assert_eq!(fs::read_to_string(path).unwrap(), "<b>x</b>");
        // No temporary files left behind
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_entries_survive_reopen() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("cache");
        let key = CacheKey::new("ruby", "puts 1");

        FileCache::new(root.clone())
            .unwrap()
            .store(&key, "kept")
            .unwrap();

        let reopened = FileCache::new(root).unwrap();
        assert_eq!(reopened.lookup(&key).unwrap(), Some("kept".to_owned()));
    }

    #[test]
    fn test_nonexistent_root_is_created() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("deeply/nested/cache");
        assert!(!root.exists());

        let cache = FileCache::new(root.clone()).unwrap();

        assert!(root.is_dir());
        assert_eq!(cache.root(), root);
    }

    #[test]
    fn test_root_blocked_by_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let err = FileCache::new(blocker.join("cache")).unwrap_err();

        assert!(matches!(err, CacheError::CreateDir { .. }));
        assert!(err.to_string().contains("blocker"));
    }

    #[test]
    fn test_unreadable_entry_is_error() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::new(tmp.path()).unwrap();
        let key = CacheKey::new("ruby", "puts 1");

        // A directory where the entry file should be cannot be read as a file
        fs::create_dir(cache.entry_path(&key)).unwrap();

        assert!(matches!(
            cache.lookup(&key),
            Err(CacheError::Read { .. })
        ));
    }

    #[test]
    fn test_concurrent_stores_same_key() {
        let tmp = TempDir::new().unwrap();
        let cache = Arc::new(FileCache::new(tmp.path()).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    let key = CacheKey::new("ruby", "puts 1");
                    cache.store(&key, "same value").unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let key = CacheKey::new("ruby", "puts 1");
        assert_eq!(cache.lookup(&key).unwrap(), Some("same value".to_owned()));
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 1);
    }
}
