//! octohl CLI - fenced code block highlighter.
//!
//! Provides commands for:
//! - `filter`: Replace fenced code blocks in documents with highlighted panels
//! - `include`: Wrap a source file in a fenced code block

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{FilterArgs, IncludeArgs};
use output::Output;

/// octohl - fenced code block highlighter.
#[derive(Parser)]
#[command(name = "octohl", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Highlight fenced code blocks in documents.
    Filter(FilterArgs),
    /// Print a fenced code block for a source file.
    Include(IncludeArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG
    let verbose = matches!(&cli.command, Commands::Filter(args) if args.verbose);
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Filter(args) => args.execute(),
        Commands::Include(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&err);
        std::process::exit(1);
    }
}
