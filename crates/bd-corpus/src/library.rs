//! Memoized corpus access.
//!
//! [`Library`] runs the [`Pipeline`] once per process and serves every query
//! from the cached result.
//!
//! # Thread Safety
//!
//! `Library` is designed for concurrent access:
//! - `load()` returns `Arc<Snapshot>` with minimal locking (just Arc clone)
//! - the first load is single-flight: concurrent callers wait for one
//!   pipeline run instead of starting their own
//! - a failed load caches nothing, so the next call runs the pipeline again
//! - a load that panics leaves the library usable; the next call retries
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use bd_convert::MarkdownConverter;
//! use bd_corpus::{Library, Pipeline};
//! use bd_storage::FsStorage;
//!
//! let pipeline = Pipeline::new(
//!     Arc::new(FsStorage::new("_posts".into())),
//!     Arc::new(MarkdownConverter::new()),
//! );
//! let library = Library::new(pipeline);
//!
//! for slug in library.slugs()? {
//!     println!("{slug}");
//! }
//! ```

use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Instant;

use crate::document::{Corpus, Document};
use crate::filter::publishable;
use crate::pipeline::{Pipeline, PipelineError};

/// Convert Duration to milliseconds as f64.
fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

/// Result of one successful pipeline run.
#[derive(Debug)]
pub struct Snapshot {
    corpus: Corpus,
    published: Corpus,
}

impl Snapshot {
    fn new(corpus: Corpus) -> Self {
        let published = publishable(&corpus);
        Self { corpus, published }
    }

    /// Full corpus, including unpublished documents.
    #[must_use]
    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// Documents visible to queries.
    #[must_use]
    pub fn published(&self) -> &Corpus {
        &self.published
    }
}

/// Process-scoped, write-once cache over a [`Pipeline`].
///
/// Uses double-checked locking:
/// - `Mutex<()>` serializes pipeline runs
/// - `RwLock<Option<Arc<Snapshot>>>` holds the result once populated
pub struct Library {
    pipeline: Pipeline,
    /// Mutex for serializing pipeline runs.
    load_lock: Mutex<()>,
    /// Populated by the first successful run, never cleared.
    snapshot: RwLock<Option<Arc<Snapshot>>>,
}

impl Library {
    /// Create a library. Nothing is loaded until the first query.
    #[must_use]
    pub fn new(pipeline: Pipeline) -> Self {
        Self {
            pipeline,
            load_lock: Mutex::new(()),
            snapshot: RwLock::new(None),
        }
    }

    /// Cached snapshot, if a load has succeeded.
    #[must_use]
    pub fn cached(&self) -> Option<Arc<Snapshot>> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(Arc::clone)
    }

    /// Get the snapshot, running the pipeline on the first call.
    ///
    /// Every call after the first success returns the same `Arc`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if the pipeline run fails. Nothing is
    /// cached in that case.
    pub fn load(&self) -> Result<Arc<Snapshot>, PipelineError> {
        // Fast path: already loaded
        if let Some(snapshot) = self.cached() {
            return Ok(snapshot);
        }

        // The lock guards no data, so a run that panicked leaves nothing to repair.
        let _guard = self
            .load_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        // Double-check after acquiring lock
        if let Some(snapshot) = self.cached() {
            return Ok(snapshot);
        }

        let start = Instant::now();
        let corpus = match self.pipeline.run() {
            Ok(corpus) => corpus,
            Err(e) => {
                tracing::error!(error = %e, elapsed_ms = elapsed_ms(start), "Failed to load documents");
                return Err(e);
            }
        };

        let snapshot = Arc::new(Snapshot::new(corpus));
        *self
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&snapshot));

        tracing::info!(
            document_count = snapshot.corpus.len(),
            published_count = snapshot.published.len(),
            elapsed_ms = elapsed_ms(start),
            "Documents loaded"
        );

        Ok(snapshot)
    }

    /// Slugs of all published documents, in no particular order.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if loading fails.
    pub fn slugs(&self) -> Result<Vec<String>, PipelineError> {
        let snapshot = self.load()?;
        Ok(snapshot.published.slugs().map(str::to_owned).collect())
    }

    /// Published document by slug. Unknown and unpublished slugs give `None`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if loading fails.
    pub fn get(&self, slug: &str) -> Result<Option<Arc<Document>>, PipelineError> {
        let snapshot = self.load()?;
        Ok(snapshot.published.get(slug).map(Arc::clone))
    }

    /// All published documents, in no particular order.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if loading fails.
    pub fn documents(&self) -> Result<Vec<Arc<Document>>, PipelineError> {
        let snapshot = self.load()?;
        Ok(snapshot.published.documents().map(Arc::clone).collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;

    use bd_convert::{Conversion, ConvertError, Converter, MarkdownConverter};
    use bd_storage::{MockStorage, Storage, StorageErrorKind};
    use pretty_assertions::assert_eq;

    use super::*;

    static_assertions::assert_impl_all!(super::Library: Send, Sync);

    fn library(storage: &Arc<MockStorage>) -> Library {
        let storage: Arc<dyn Storage> = Arc::clone(storage) as Arc<dyn Storage>;
        Library::new(Pipeline::new(storage, Arc::new(MarkdownConverter::new())))
    }

    #[test]
    fn test_nothing_loaded_before_first_query() {
        let storage = Arc::new(MockStorage::new().with_document("/a", ""));
        let library = library(&storage);

        assert!(library.cached().is_none());
        assert_eq!(storage.scan_count(), 0);
    }

    #[test]
    fn test_load_is_memoized() {
        let storage = Arc::new(
            MockStorage::new()
                .with_document("/a", "[b](b.md)")
                .with_document("/b", ""),
        );
        let library = library(&storage);

        let first = library.load().unwrap();
        let second = library.load().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(storage.scan_count(), 1);
        assert_eq!(storage.read_count(), 2);
    }

    #[test]
    fn test_queries_share_one_run() {
        let storage = Arc::new(MockStorage::new().with_document("/a", "# A"));
        let library = library(&storage);

        library.slugs().unwrap();
        library.get("/a").unwrap();
        library.documents().unwrap();

        assert_eq!(storage.scan_count(), 1);
        assert_eq!(storage.read_count(), 1);
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let storage = Arc::new(
            MockStorage::new()
                .with_document("/a", "")
                .with_scan_failure(StorageErrorKind::Timeout),
        );
        let library = library(&storage);

        assert!(library.load().is_err());
        assert!(library.cached().is_none());

        storage.clear_scan_failure();
        let snapshot = library.load().unwrap();

        assert_eq!(snapshot.corpus().len(), 1);
        assert_eq!(storage.scan_count(), 2);
    }

    #[test]
    fn test_queries_hide_unpublished() {
        let storage = Arc::new(
            MockStorage::new()
                .with_document("/a", "---\ntags: [nopub]\n---\n# A")
                .with_document("/b", "[a](a.md)"),
        );
        let library = library(&storage);

        assert_eq!(library.slugs().unwrap(), vec!["/b".to_owned()]);
        assert!(library.get("/a").unwrap().is_none());
        assert_eq!(library.documents().unwrap().len(), 1);

        let snapshot = library.load().unwrap();
        let hidden = snapshot.corpus().get("/a").unwrap();
        assert_eq!(
            hidden.backlinks.iter().collect::<Vec<_>>(),
            vec!["/b"]
        );
    }

    #[test]
    fn test_get_unknown_slug_is_none() {
        let storage = Arc::new(MockStorage::new().with_document("/a", ""));
        let library = library(&storage);

        assert!(library.get("/missing").unwrap().is_none());
    }

    #[test]
    fn test_get_returns_shared_document() {
        let storage = Arc::new(MockStorage::new().with_document("/a", "# A"));
        let library = library(&storage);

        let first = library.get("/a").unwrap().unwrap();
        let second = library.get("/a").unwrap().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.content.title.as_deref(), Some("A"));
    }

    #[test]
    fn test_concurrent_first_load_runs_once() {
        let storage = Arc::new(
            MockStorage::new()
                .with_document("/a", "[b](b.md)")
                .with_document("/b", "[a](a.md)"),
        );
        let library = Arc::new(library(&storage));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let library = Arc::clone(&library);
                thread::spawn(move || library.load().unwrap())
            })
            .collect();
        let snapshots: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(storage.scan_count(), 1);
        assert!(snapshots.iter().all(|s| Arc::ptr_eq(s, &snapshots[0])));
    }

    #[test]
    fn test_load_recovers_after_converter_panic() {
        let storage = Arc::new(MockStorage::new().with_document("/a", "# A"));
        let crashed = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&crashed);
        let converter = move |raw: &str| -> Result<Conversion, ConvertError> {
            if !flag.swap(true, Ordering::SeqCst) {
                panic!("converter crashed");
            }
            MarkdownConverter::new().convert(raw)
        };
        let storage_dyn: Arc<dyn Storage> = Arc::clone(&storage) as Arc<dyn Storage>;
        let library = Arc::new(Library::new(Pipeline::new(
            storage_dyn,
            Arc::new(converter),
        )));

        let first = {
            let library = Arc::clone(&library);
            thread::spawn(move || library.load().map(|_| ()))
        };
        assert!(first.join().is_err());
        assert!(library.cached().is_none());

        let snapshot = library.load().unwrap();

        assert!(crashed.load(Ordering::SeqCst));
        assert_eq!(snapshot.corpus().len(), 1);
        assert_eq!(storage.scan_count(), 2);
    }
}
