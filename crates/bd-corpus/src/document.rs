//! Document values for each pipeline stage, and the corpus they form.
//!
//! Every stage produces new values instead of mutating the previous ones:
//!
//! ```text
//! SourceRef -> ConvertedDocument -> ResolvedDocument -> Document
//!   (scan)       (convert)            (resolve)          (index)
//! ```

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use bd_convert::{Content, Tags};
use serde::Serialize;

/// A document after conversion: links are still as authored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConvertedDocument {
    /// Canonical publish identifier.
    pub slug: String,
    /// Publishable content.
    pub content: Content,
    /// Outbound link targets as authored.
    pub links: Vec<String>,
    /// Metadata tags.
    pub tags: Tags,
}

/// A document whose outbound links are canonical slugs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedDocument {
    /// Canonical publish identifier.
    pub slug: String,
    /// Publishable content.
    pub content: Content,
    /// Canonical slugs this document links to. May include dangling targets.
    pub outbound_links: BTreeSet<String>,
    /// Metadata tags.
    pub tags: Tags,
}

/// A fully processed document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Document {
    /// Canonical publish identifier (e.g., "/notes/rust").
    pub slug: String,
    /// Publishable content.
    pub content: Content,
    /// Canonical slugs this document links to.
    pub outbound_links: BTreeSet<String>,
    /// Slugs of documents linking to this one. Empty, never absent, when
    /// nothing links here.
    pub backlinks: BTreeSet<String>,
    /// Metadata tags.
    pub tags: Tags,
}

impl Document {
    /// True if the document must not be exposed by queries.
    #[must_use]
    pub fn is_unpublished(&self) -> bool {
        self.tags.is_unpublished()
    }
}

/// Mapping from slug to document.
///
/// Has no intrinsic order. Documents are shared via `Arc` so filtered views
/// and query results don't copy content.
#[derive(Clone, Debug, Default)]
pub struct Corpus {
    documents: HashMap<String, Arc<Document>>,
}

impl Corpus {
    /// Get a document by slug.
    #[must_use]
    pub fn get(&self, slug: &str) -> Option<&Arc<Document>> {
        self.documents.get(slug)
    }

    /// Check whether a slug is present.
    #[must_use]
    pub fn contains(&self, slug: &str) -> bool {
        self.documents.contains_key(slug)
    }

    /// Backlinks of a document, if it exists.
    #[must_use]
    pub fn backlinks(&self, slug: &str) -> Option<&BTreeSet<String>> {
        self.get(slug).map(|doc| &doc.backlinks)
    }

    /// Iterate over all slugs.
    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }

    /// Iterate over all documents.
    pub fn documents(&self) -> impl Iterator<Item = &Arc<Document>> {
        self.documents.values()
    }

    /// Number of documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// True if the corpus has no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Build a new corpus holding the documents matching `predicate`.
    #[must_use]
    pub fn select(&self, predicate: impl Fn(&Document) -> bool) -> Self {
        self.documents
            .iter()
            .filter(|(_, doc)| predicate(doc))
            .map(|(slug, doc)| (slug.clone(), Arc::clone(doc)))
            .collect()
    }
}

/// Later documents replace earlier ones with the same slug; the pipeline
/// rejects duplicates before this point.
impl FromIterator<Document> for Corpus {
    fn from_iter<I: IntoIterator<Item = Document>>(iter: I) -> Self {
        iter.into_iter()
            .map(|doc| (doc.slug.clone(), Arc::new(doc)))
            .collect()
    }
}

impl FromIterator<(String, Arc<Document>)> for Corpus {
    fn from_iter<I: IntoIterator<Item = (String, Arc<Document>)>>(iter: I) -> Self {
        Self {
            documents: iter.into_iter().collect(),
        }
    }
}
