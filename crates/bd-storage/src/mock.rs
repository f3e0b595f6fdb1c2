//! Mock storage implementation for testing.
//!
//! Provides [`MockStorage`] for unit testing without filesystem access.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::storage::{SourceRef, Storage, StorageError, StorageErrorKind};

/// Backend identifier for error messages.
const BACKEND: &str = "Mock";

/// Mock storage for testing.
///
/// Stores documents in memory, keyed by slug. Counts calls to
/// [`scan`](Storage::scan) and [`read`](Storage::read) so tests can observe
/// whether a consumer re-ran its work.
///
/// # Example
///
/// ```ignore
/// use bd_storage::{MockStorage, Storage};
///
/// let storage = MockStorage::new()
///     .with_document("/a", "[b](/b)")
///     .with_document("/b", "# B");
///
/// let sources = storage.scan().unwrap();
/// assert_eq!(storage.scan_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockStorage {
    documents: RwLock<Vec<SourceRef>>,
    contents: RwLock<HashMap<String, String>>,
    unreadable: RwLock<Vec<String>>,
    scan_failure: RwLock<Option<StorageErrorKind>>,
    scans: AtomicUsize,
    reads: AtomicUsize,
}

impl MockStorage {
    /// Create a new empty mock storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document with the given slug and raw content.
    ///
    /// The document's path is synthesized as `/mock<slug>.md`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_document(self, slug: impl Into<String>, content: impl Into<String>) -> Self {
        let slug = slug.into();
        let path = PathBuf::from(format!("/mock{slug}.md"));
        self.documents
            .write()
            .unwrap()
            .push(SourceRef::new(slug.clone(), path));
        self.contents.write().unwrap().insert(slug, content.into());
        self
    }

    /// Add a document whose content cannot be read.
    ///
    /// The document is reported by `scan()`, but `read()` fails with
    /// [`StorageErrorKind::PermissionDenied`].
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_unreadable(self, slug: impl Into<String>) -> Self {
        let slug = slug.into();
        let path = PathBuf::from(format!("/mock{slug}.md"));
        self.documents
            .write()
            .unwrap()
            .push(SourceRef::new(slug.clone(), path));
        self.unreadable.write().unwrap().push(slug);
        self
    }

    /// Make every `scan()` fail with the given error kind.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_scan_failure(self, kind: StorageErrorKind) -> Self {
        *self.scan_failure.write().unwrap() = Some(kind);
        self
    }

    /// Stop failing scans.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn clear_scan_failure(&self) {
        *self.scan_failure.write().unwrap() = None;
    }

    /// Number of `scan()` calls so far.
    #[must_use]
    pub fn scan_count(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }

    /// Number of `read()` calls so far.
    #[must_use]
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl Storage for MockStorage {
    fn scan(&self) -> Result<Vec<SourceRef>, StorageError> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        if let Some(kind) = *self.scan_failure.read().unwrap() {
            return Err(StorageError::new(kind).with_backend(BACKEND));
        }
        Ok(self.documents.read().unwrap().clone())
    }

    fn read(&self, source: &SourceRef) -> Result<String, StorageError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.unreadable.read().unwrap().contains(&source.slug) {
            return Err(StorageError::new(StorageErrorKind::PermissionDenied)
                .with_path(&source.path)
                .with_backend(BACKEND));
        }
        self.contents
            .read()
            .unwrap()
            .get(&source.slug)
            .cloned()
            .ok_or_else(|| StorageError::not_found(&source.path).with_backend(BACKEND))
    }
}
