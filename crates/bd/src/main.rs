//! braindump CLI - personal notes publisher with backlinks.
//!
//! Provides commands for:
//! - `list`: Print published document slugs
//! - `show`: Print one published document as JSON
//! - `export`: Write every published document as JSON files

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ExportArgs, ListArgs, ShowArgs};
use output::Output;

/// braindump - notes publisher with backlinks.
#[derive(Parser)]
#[command(name = "bd", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List published document slugs.
    List(ListArgs),
    /// Show a published document as JSON.
    Show(ShowArgs),
    /// Export all published documents as JSON.
    Export(ExportArgs),
}

impl Commands {
    fn verbose(&self) -> bool {
        match self {
            Self::List(args) => args.load.verbose,
            Self::Show(args) => args.load.verbose,
            Self::Export(args) => args.load.verbose,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.command.verbose() {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::List(args) => args.execute(),
        Commands::Show(args) => args.execute(),
        Commands::Export(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
