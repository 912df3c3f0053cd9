//! `octohl filter` command implementation.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use clap::Args;
use octohl_cache::{FileCache, HighlightCache};
use octohl_config::{CliSettings, Config};
use octohl_filter::CodeFilter;
use octohl_highlight::{CachedHighlighter, Highlighter, Pygments};
use rayon::prelude::*;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the filter command.
#[derive(Args)]
pub(crate) struct FilterArgs {
    /// Documents to filter (default: read stdin, write stdout).
    files: Vec<PathBuf>,

    /// Rewrite each file in place instead of printing it.
    #[arg(short, long, requires = "files")]
    in_place: bool,

    /// Path to configuration file (default: auto-discover octohl.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Highlight cache directory (overrides config).
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// pygmentize program (overrides config).
    #[arg(long)]
    pygmentize: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl FilterArgs {
    /// Execute the filter command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the cache directory cannot be
    /// created, or any document fails to filter.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            cache_dir: self.cache_dir,
            pygmentize: self.pygmentize,
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let cache = FileCache::new(&config.cache_resolved.dir)?;
        if self.verbose {
            output.cache_dir(cache.root());
        }
        let filter = CodeFilter::new(CachedHighlighter::new(
            Pygments::new(&config.highlight.pygmentize),
            cache,
        ));

        if self.files.is_empty() {
            let mut content = String::new();
            io::stdin().read_to_string(&mut content)?;
            let html = filter.run(&content)?;
            io::stdout().lock().write_all(html.as_bytes())?;
            return Ok(());
        }

        // Documents are independent; the cache tolerates concurrent writers.
        let filtered = self
            .files
            .par_iter()
            .map(|path| filter_file(&filter, path))
            .collect::<Result<Vec<_>, _>>()?;

        if self.in_place {
            for (path, html) in &filtered {
                fs::write(path, html)?;
            }
            output.filtered(filtered.len());
        } else {
            let mut stdout = io::stdout().lock();
            for (_, html) in &filtered {
                stdout.write_all(html.as_bytes())?;
            }
        }

        Ok(())
    }
}

/// Read and filter one document.
fn filter_file<'a, H: Highlighter, C: HighlightCache>(
    filter: &CodeFilter<H, C>,
    path: &'a Path,
) -> Result<(&'a Path, String), CliError> {
    let content = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!("filtering {}", path.display());
    let html = filter.run(&content).map_err(|source| CliError::Document {
        path: path.to_path_buf(),
        source,
    })?;
    Ok((path, html))
}
