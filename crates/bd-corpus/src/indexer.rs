//! Backlink index.
//!
//! Inverts the resolved outbound links of every document. Only documents in
//! the corpus become keys, each initialized to an empty set, so a document
//! nothing links to still has (empty) backlinks and dangling targets never
//! show up as keys.

use std::collections::{BTreeSet, HashMap};

use crate::document::{Document, ResolvedDocument};

/// Mapping from a document slug to the slugs of documents linking to it.
#[derive(Debug, Default)]
pub struct BacklinkIndex {
    backlinks: HashMap<String, BTreeSet<String>>,
}

impl BacklinkIndex {
    /// Build the index over a complete set of resolved documents.
    ///
    /// Must run after every document is resolved: backlinks of one document
    /// depend on the links of all others.
    #[must_use]
    pub fn build(documents: &[ResolvedDocument]) -> Self {
        let mut backlinks: HashMap<String, BTreeSet<String>> = documents
            .iter()
            .map(|doc| (doc.slug.clone(), BTreeSet::new()))
            .collect();

        let mut dangling = 0usize;
        for doc in documents {
            for target in &doc.outbound_links {
                match backlinks.get_mut(target) {
                    Some(sources) => {
                        sources.insert(doc.slug.clone());
                    }
                    None => dangling += 1,
                }
            }
        }

        tracing::debug!(
            document_count = backlinks.len(),
            dangling_links = dangling,
            "Backlink index built"
        );

        Self { backlinks }
    }

    /// Backlinks of `slug`, or `None` if it is not a document.
    #[must_use]
    pub fn get(&self, slug: &str) -> Option<&BTreeSet<String>> {
        self.backlinks.get(slug)
    }

    /// Number of indexed documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.backlinks.len()
    }

    /// True if no documents are indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.backlinks.is_empty()
    }

    fn take(&mut self, slug: &str) -> BTreeSet<String> {
        self.backlinks.remove(slug).unwrap_or_default()
    }
}

/// Attach backlinks to every resolved document.
#[must_use]
pub fn index(documents: Vec<ResolvedDocument>) -> Vec<Document> {
    let mut index = BacklinkIndex::build(&documents);

    documents
        .into_iter()
        .map(|doc| {
            let backlinks = index.take(&doc.slug);
            Document {
                slug: doc.slug,
                content: doc.content,
                outbound_links: doc.outbound_links,
                backlinks,
                tags: doc.tags,
            }
        })
        .collect()
}
