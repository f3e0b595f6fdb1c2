//! `bd export` command implementation.
//!
//! Output layout:
//!
//! ```text
//! <out>/index.json          sorted list of published slugs
//! <out>/docs/<slug>.json    one file per published document
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bd_corpus::Document;
use clap::Args;

use super::LoadArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the export command.
#[derive(Args)]
pub(crate) struct ExportArgs {
    /// Output directory.
    #[arg(short, long)]
    out: PathBuf,

    #[command(flatten)]
    pub load: LoadArgs,
}

impl ExportArgs {
    /// Write every published document as JSON.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let library = self.load.library(&output)?;

        output.info(&format!("Output: {}", self.out.display()));

        let documents = library.documents()?;
        let written = write_export(&self.out, &documents)?;

        output.success(&format!("Exported {written} documents"));
        Ok(())
    }
}

/// Write documents and the slug index under `out`. Returns the document count.
fn write_export(out: &Path, documents: &[Arc<Document>]) -> Result<usize, CliError> {
    let docs_dir = out.join("docs");
    fs::create_dir_all(&docs_dir)?;

    let mut slugs = Vec::with_capacity(documents.len());
    for document in documents {
        let path = document_path(&docs_dir, &document.slug);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, serde_json::to_vec_pretty(document.as_ref())?)?;
        tracing::debug!(slug = %document.slug, path = %path.display(), "Exported document");
        slugs.push(document.slug.as_str());
    }

    slugs.sort_unstable();
    fs::write(out.join("index.json"), serde_json::to_vec_pretty(&slugs)?)?;

    Ok(slugs.len())
}

/// File for a slug: `/notes/rust` -> `<docs_dir>/notes/rust.json`.
fn document_path(docs_dir: &Path, slug: &str) -> PathBuf {
    docs_dir.join(format!("{}.json", slug.trim_start_matches('/')))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use bd_convert::{Content, Tags};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn document(slug: &str, backlinks: &[&str]) -> Arc<Document> {
        Arc::new(Document {
            slug: slug.to_owned(),
            content: Content {
                title: Some("Title".to_owned()),
                html: "<p>Body</p>\n".to_owned(),
            },
            outbound_links: BTreeSet::new(),
            backlinks: backlinks.iter().map(|&s| s.to_owned()).collect(),
            tags: Tags::new(),
        })
    }

    #[test]
    fn test_document_path() {
        assert_eq!(
            document_path(Path::new("/out/docs"), "/notes/rust"),
            PathBuf::from("/out/docs/notes/rust.json")
        );
    }

    #[test]
    fn test_document_path_keeps_dots_in_name() {
        assert_eq!(
            document_path(Path::new("/out/docs"), "/v1.2"),
            PathBuf::from("/out/docs/v1.2.json")
        );
    }

    #[test]
    fn test_write_export() {
        let dir = TempDir::new().unwrap();
        let documents = vec![document("/b", &["/a"]), document("/notes/a", &[])];

        let written = write_export(dir.path(), &documents).unwrap();

        assert_eq!(written, 2);
        let index: Vec<String> =
            serde_json::from_slice(&fs::read(dir.path().join("index.json")).unwrap()).unwrap();
        assert_eq!(index, vec!["/b", "/notes/a"]);

        let doc: serde_json::Value =
            serde_json::from_slice(&fs::read(dir.path().join("docs/b.json")).unwrap()).unwrap();
        assert_eq!(doc["slug"], "/b");
        assert_eq!(doc["backlinks"][0], "/a");
        assert!(dir.path().join("docs/notes/a.json").exists());
    }
}
