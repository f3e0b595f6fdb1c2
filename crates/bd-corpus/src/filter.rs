//! Publication filter.

use crate::document::Corpus;

/// Corpus view without documents tagged unpublished.
///
/// Surviving documents keep their backlinks unchanged, including backlinks
/// from unpublished documents.
#[must_use]
pub fn publishable(corpus: &Corpus) -> Corpus {
    corpus.select(|doc| !doc.is_unpublished())
}
