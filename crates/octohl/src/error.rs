//! CLI error types.

use std::path::PathBuf;

use octohl_cache::CacheError;
use octohl_config::ConfigError;
use octohl_filter::FilterError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Cache(#[from] CacheError),

    #[error("{0}")]
    Filter(#[from] FilterError),

    #[error("{}: {source}", .path.display())]
    Document { path: PathBuf, source: FilterError },

    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}
