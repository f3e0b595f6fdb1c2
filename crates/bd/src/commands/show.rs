//! `bd show` command implementation.

use clap::Args;

use super::LoadArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the show command.
#[derive(Args)]
pub(crate) struct ShowArgs {
    /// Document slug (e.g., /notes/rust). A missing leading slash is added.
    slug: String,

    #[command(flatten)]
    pub load: LoadArgs,
}

impl ShowArgs {
    /// Print one published document as JSON.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let library = self.load.library(&output)?;

        let slug = normalize_slug(&self.slug);
        let document = library
            .get(&slug)?
            .ok_or_else(|| CliError::NotFound(slug))?;

        output.data(&serde_json::to_string_pretty(document.as_ref())?)?;
        Ok(())
    }
}

/// Accept `notes/rust` as well as `/notes/rust`.
fn normalize_slug(slug: &str) -> String {
    if slug.starts_with('/') {
        slug.to_owned()
    } else {
        format!("/{slug}")
    }
}
