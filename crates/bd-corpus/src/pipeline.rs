//! Corpus pipeline.
//!
//! Runs the stages in a fixed order, each a barrier over the whole corpus:
//!
//! 1. Scan: list sources from [`Storage`]
//! 2. Convert: read and convert every source in parallel
//! 3. Resolve: canonicalize outbound links
//! 4. Index: attach backlinks
//!
//! A run either produces the complete corpus or fails. Under
//! [`FailurePolicy::Skip`] failing documents are omitted instead.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use bd_convert::{ConvertError, Converter};
use bd_storage::{DEFAULT_SUFFIX, SourceRef, Storage, StorageError};
use rayon::prelude::*;

use crate::document::{ConvertedDocument, Corpus, ResolvedDocument};
use crate::indexer::index;
use crate::resolver::Resolver;

/// Error from a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Listing the document store failed.
    #[error("Failed to scan documents: {0}")]
    Scan(#[from] StorageError),
    /// Reading one document failed.
    #[error("Failed to read {slug} ({}): {source}", .path.display())]
    Read {
        /// Slug of the failing document.
        slug: String,
        /// Location in the document store.
        path: PathBuf,
        /// Underlying storage error.
        #[source]
        source: StorageError,
    },
    /// Converting one document failed.
    #[error("Failed to convert {slug} ({}): {source}", .path.display())]
    Convert {
        /// Slug of the failing document.
        slug: String,
        /// Location in the document store.
        path: PathBuf,
        /// Underlying converter error.
        #[source]
        source: ConvertError,
    },
    /// Two sources map to the same slug.
    #[error("Duplicate slug: {0}")]
    DuplicateSlug(String),
}

/// What to do when a single document cannot be read or converted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Fail the whole run. No partial corpus is produced.
    #[default]
    Abort,
    /// Log the failure and leave the document out of the corpus.
    Skip,
}

/// Staged pipeline from a document store to an indexed [`Corpus`].
pub struct Pipeline {
    storage: Arc<dyn Storage>,
    converter: Arc<dyn Converter>,
    resolver: Resolver,
    policy: FailurePolicy,
}

impl Pipeline {
    /// Create a pipeline with the default suffix and [`FailurePolicy::Abort`].
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>, converter: Arc<dyn Converter>) -> Self {
        Self {
            storage,
            converter,
            resolver: Resolver::new(DEFAULT_SUFFIX),
            policy: FailurePolicy::default(),
        }
    }

    /// Set the source suffix stripped from link targets.
    ///
    /// Should match the suffix the storage scans for.
    #[must_use]
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.resolver = Resolver::new(suffix);
        self
    }

    /// Set the per-document failure policy.
    #[must_use]
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Get the failure policy.
    #[must_use]
    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Run every stage and build the full corpus.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if the scan fails, slugs collide, or (under
    /// [`FailurePolicy::Abort`]) any document fails to read or convert.
    pub fn run(&self) -> Result<Corpus, PipelineError> {
        let sources = self.scan()?;

        let convert_start = Instant::now();
        let converted = self.convert_all(&sources)?;
        let convert_ms = convert_start.elapsed().as_secs_f64() * 1000.0;

        let resolved: Vec<ResolvedDocument> = converted
            .into_iter()
            .map(|doc| self.resolver.resolve_document(doc))
            .collect();
        let documents = index(resolved);

        tracing::debug!(
            source_count = sources.len(),
            document_count = documents.len(),
            convert_ms,
            "Pipeline run completed"
        );

        Ok(documents.into_iter().collect())
    }

    fn scan(&self) -> Result<Vec<SourceRef>, PipelineError> {
        let sources = self.storage.scan()?;

        let mut seen = HashSet::with_capacity(sources.len());
        for source in &sources {
            if !seen.insert(source.slug.as_str()) {
                tracing::error!(slug = %source.slug, path = %source.path.display(), "Duplicate slug");
                return Err(PipelineError::DuplicateSlug(source.slug.clone()));
            }
        }

        Ok(sources)
    }

    /// Convert all sources. Returns only once every source has finished.
    fn convert_all(&self, sources: &[SourceRef]) -> Result<Vec<ConvertedDocument>, PipelineError> {
        let results: Vec<Result<ConvertedDocument, PipelineError>> = sources
            .par_iter()
            .map(|source| self.convert_one(source))
            .collect();

        let mut converted = Vec::with_capacity(results.len());
        let mut first_error = None;
        for result in results {
            match result {
                Ok(doc) => converted.push(doc),
                Err(e) if self.policy == FailurePolicy::Skip => {
                    tracing::warn!(error = %e, "Skipping document");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Document failed");
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(converted),
        }
    }

    fn convert_one(&self, source: &SourceRef) -> Result<ConvertedDocument, PipelineError> {
        let raw = self
            .storage
            .read(source)
            .map_err(|e| PipelineError::Read {
                slug: source.slug.clone(),
                path: source.path.clone(),
                source: e,
            })?;

        let conversion = self
            .converter
            .convert(&raw)
            .map_err(|e| PipelineError::Convert {
                slug: source.slug.clone(),
                path: source.path.clone(),
                source: e,
            })?;

        Ok(ConvertedDocument {
            slug: source.slug.clone(),
            content: conversion.content,
            links: conversion.links,
            tags: conversion.tags,
        })
    }
}

#[cfg(test)]
mod tests {
    use bd_convert::{Conversion, MarkdownConverter};
    use bd_storage::{MockStorage, StorageErrorKind};
    use pretty_assertions::assert_eq;

    use super::*;

    fn pipeline(storage: MockStorage) -> Pipeline {
        Pipeline::new(Arc::new(storage), Arc::new(MarkdownConverter::new()))
    }

    fn backlinks(corpus: &Corpus, slug: &str) -> Vec<String> {
        corpus
            .backlinks(slug)
            .unwrap()
            .iter()
            .cloned()
            .collect()
    }

    #[test]
    fn test_run_builds_backlinks() {
        let storage = MockStorage::new()
            .with_document("/a", "# A\n\n[b](b.md)")
            .with_document("/b", "# B\n\n[c](/c)")
            .with_document("/c", "# C");

        let corpus = pipeline(storage).run().unwrap();

        assert_eq!(corpus.len(), 3);
        assert!(backlinks(&corpus, "/a").is_empty());
        assert_eq!(backlinks(&corpus, "/b"), vec!["/a"]);
        assert_eq!(backlinks(&corpus, "/c"), vec!["/b"]);
        assert_eq!(
            corpus.get("/a").unwrap().content.title.as_deref(),
            Some("A")
        );
    }

    #[test]
    fn test_run_resolves_relative_links() {
        let storage = MockStorage::new()
            .with_document("/notes/rust", "[go](go.md) [home](../index.md#top)")
            .with_document("/notes/go", "")
            .with_document("/index", "");

        let corpus = pipeline(storage).run().unwrap();

        assert_eq!(backlinks(&corpus, "/notes/go"), vec!["/notes/rust"]);
        assert_eq!(backlinks(&corpus, "/index"), vec!["/notes/rust"]);
    }

    #[test]
    fn test_empty_store() {
        let corpus = pipeline(MockStorage::new()).run().unwrap();

        assert!(corpus.is_empty());
    }

    #[test]
    fn test_scan_failure_is_fatal() {
        let storage = MockStorage::new()
            .with_document("/a", "")
            .with_scan_failure(StorageErrorKind::PermissionDenied);

        let err = pipeline(storage).run().unwrap_err();

        assert!(matches!(err, PipelineError::Scan(_)));
    }

    #[test]
    fn test_read_failure_aborts_by_default() {
        let storage = MockStorage::new()
            .with_document("/a", "")
            .with_unreadable("/b");

        let err = pipeline(storage).run().unwrap_err();

        match err {
            PipelineError::Read { slug, .. } => assert_eq!(slug, "/b"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_convert_failure_aborts_by_default() {
        let storage = MockStorage::new()
            .with_document("/good", "ok")
            .with_document("/bad", "---\ntitle: [unclosed\n---\n");

        let err = pipeline(storage).run().unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Convert { ref slug, .. } if slug == "/bad"
        ));
        assert!(err.to_string().starts_with("Failed to convert /bad"));
    }

    #[test]
    fn test_skip_policy_omits_failing_documents() {
        let storage = MockStorage::new()
            .with_document("/a", "[b](b.md) [bad](bad.md)")
            .with_document("/b", "")
            .with_document("/bad", "---\ntitle: [unclosed\n---\n")
            .with_unreadable("/locked");

        let corpus = pipeline(storage)
            .with_policy(FailurePolicy::Skip)
            .run()
            .unwrap();

        let mut slugs: Vec<_> = corpus.slugs().collect();
        slugs.sort_unstable();
        assert_eq!(slugs, vec!["/a", "/b"]);
        assert_eq!(backlinks(&corpus, "/b"), vec!["/a"]);
        assert!(corpus.get("/bad").is_none());
    }

    #[test]
    fn test_duplicate_slug_is_error() {
        struct Duplicated;

        impl Storage for Duplicated {
            fn scan(&self) -> Result<Vec<SourceRef>, StorageError> {
                Ok(vec![
                    SourceRef::new("/a", "a.md"),
                    SourceRef::new("/a", "a/index.md"),
                ])
            }

            fn read(&self, _source: &SourceRef) -> Result<String, StorageError> {
                Ok(String::new())
            }
        }

        let err = Pipeline::new(Arc::new(Duplicated), Arc::new(MarkdownConverter::new()))
            .run()
            .unwrap_err();

        assert!(matches!(err, PipelineError::DuplicateSlug(slug) if slug == "/a"));
    }

    #[test]
    fn test_custom_converter_and_suffix() {
        let converter = |raw: &str| -> Result<Conversion, ConvertError> {
            Ok(Conversion {
                links: raw.split_whitespace().map(str::to_owned).collect(),
                ..Conversion::default()
            })
        };
        let storage = MockStorage::new()
            .with_document("/a", "b.org")
            .with_document("/b", "");

        let corpus = Pipeline::new(Arc::new(storage), Arc::new(converter))
            .with_suffix(".org")
            .run()
            .unwrap();

        assert_eq!(backlinks(&corpus, "/b"), vec!["/a"]);
    }

    #[test]
    fn test_default_policy() {
        assert_eq!(pipeline(MockStorage::new()).policy(), FailurePolicy::Abort);
    }
}
