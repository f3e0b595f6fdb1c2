//! `bd list` command implementation.

use clap::Args;

use super::LoadArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the list command.
#[derive(Args)]
pub(crate) struct ListArgs {
    #[command(flatten)]
    pub load: LoadArgs,
}

impl ListArgs {
    /// Print published slugs, sorted.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let library = self.load.library(&output)?;

        let mut slugs = library.slugs()?;
        slugs.sort_unstable();

        for slug in &slugs {
            output.data(slug)?;
        }

        if slugs.is_empty() {
            output.warning("No published documents");
        } else {
            output.detail(&format!("{} published documents", slugs.len()));
        }
        Ok(())
    }
}
