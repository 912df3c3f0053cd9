//! `octohl include` command implementation.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;
use octohl_config::{CliSettings, Config};
use octohl_filter::{RenderOptions, include_code};

use crate::error::CliError;

/// Arguments for the include command.
#[derive(Args)]
pub(crate) struct IncludeArgs {
    /// Source file to wrap in a fenced code block.
    file: PathBuf,

    /// Highlighter language.
    #[arg(short, long)]
    lang: Option<String>,

    /// Panel title.
    #[arg(short, long)]
    title: Option<String>,

    /// Download URL (default: href base + file name).
    #[arg(long)]
    href: Option<String>,

    /// Base URL for the default download link (overrides config).
    #[arg(long)]
    href_base: Option<String>,

    /// Render without line numbers.
    #[arg(long)]
    no_linenos: bool,

    /// Path to configuration file (default: auto-discover octohl.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl IncludeArgs {
    /// Execute the include command.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            href_base: self.href_base,
            ..CliSettings::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let options = RenderOptions {
            language: self.lang,
            title: self.title,
            href: self.href,
            line_numbers: !self.no_linenos,
        };
        let fenced = include_code(&self.file, &options, config.include.href_base.as_deref())?;

        io::stdout().lock().write_all(fenced.as_bytes())?;
        Ok(())
    }
}
