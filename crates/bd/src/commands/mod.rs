//! CLI command implementations.

pub(crate) mod export;
pub(crate) mod list;
pub(crate) mod show;

use std::path::PathBuf;
use std::sync::Arc;

use bd_config::{CliSettings, Config, Mode, OnError};
use bd_convert::MarkdownConverter;
use bd_corpus::{FailurePolicy, Library, Pipeline};
use bd_storage::FsStorage;
use clap::Args;

use crate::error::CliError;
use crate::output::Output;

pub(crate) use export::ExportArgs;
pub(crate) use list::ListArgs;
pub(crate) use show::ShowArgs;

/// Options shared by every command that loads documents.
#[derive(Args)]
pub(crate) struct LoadArgs {
    /// Path to configuration file (default: auto-discover braindump.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Document source directory (overrides config and mode).
    #[arg(short, long)]
    source_dir: Option<PathBuf>,

    /// Read from the development directory.
    #[arg(long)]
    dev: bool,

    /// Leave out documents that fail to load instead of aborting.
    #[arg(long)]
    skip_errors: bool,

    /// Enable verbose output (show timing logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl LoadArgs {
    /// Load configuration and build a library over the configured source.
    pub(crate) fn library(&self, output: &Output) -> Result<Library, CliError> {
        let cli_settings = CliSettings {
            mode: self.dev.then_some(Mode::Development),
            source_dir: self.source_dir.clone(),
            on_error: self.skip_errors.then_some(OnError::Skip),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        output.detail(&format!("Source: {}", config.source_dir().display()));

        let policy = match config.pipeline.on_error {
            OnError::Abort => FailurePolicy::Abort,
            OnError::Skip => {
                output.warning("Documents that fail to load will be skipped");
                FailurePolicy::Skip
            }
        };

        let storage = FsStorage::with_suffix(config.source_dir().to_path_buf(), config.suffix());
        let pipeline = Pipeline::new(Arc::new(storage), Arc::new(MarkdownConverter::new()))
            .with_suffix(config.suffix())
            .with_policy(policy);

        Ok(Library::new(pipeline))
    }
}
