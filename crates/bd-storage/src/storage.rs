//! Storage trait and error types.
//!
//! Provides the core [`Storage`] trait for discovering source documents and
//! reading their raw content, along with [`StorageError`] for unified error
//! handling across backends.
//!
//! # Slug Convention
//!
//! Every discovered document is identified by a **slug**: a path-like string
//! with a leading `/`, `/` separators, and the source suffix stripped:
//! - `rust.md` -> `"/rust"`
//! - `notes/rust.md` -> `"/notes/rust"`
//! - `notes/index.md` -> `"/notes/index"`

use std::path::{Path, PathBuf};

/// Skeleton of a discovered source document.
///
/// Produced once per scan. Carries only the identity and location of the
/// document; no content has been read yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceRef {
    /// Canonical publish identifier (e.g., "/notes/rust").
    pub slug: String,
    /// Absolute location of the source on the document store.
    pub path: PathBuf,
}

impl SourceRef {
    /// Create a new source reference.
    #[must_use]
    pub fn new(slug: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            slug: slug.into(),
            path: path.into(),
        }
    }
}

/// Semantic error categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum StorageErrorKind {
    /// Resource does not exist.
    NotFound,
    /// Permission denied.
    PermissionDenied,
    /// Invalid path or identifier.
    InvalidPath,
    /// Content is not valid UTF-8.
    InvalidData,
    /// Operation timed out.
    Timeout,
    /// Other/unknown error category.
    Other,
}

/// Storage error with semantic kind and backend-specific source.
#[derive(Debug)]
pub struct StorageError {
    /// Semantic error category.
    pub kind: StorageErrorKind,
    /// Path context (if applicable).
    pub path: Option<PathBuf>,
    /// Backend identifier (e.g., "Fs", "Mock").
    pub backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StorageError {
    /// Create a new storage error.
    #[must_use]
    pub fn new(kind: StorageErrorKind) -> Self {
        Self {
            kind,
            path: None,
            backend: None,
            source: None,
        }
    }

    /// Attach path context.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Create a not found error with path.
    #[must_use]
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::new(StorageErrorKind::NotFound).with_path(path)
    }

    /// Create a storage error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error, path: Option<PathBuf>) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => StorageErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => StorageErrorKind::PermissionDenied,
            std::io::ErrorKind::InvalidData => StorageErrorKind::InvalidData,
            std::io::ErrorKind::TimedOut => StorageErrorKind::Timeout,
            _ => StorageErrorKind::Other,
        };
        let mut error = Self::new(kind).with_source(err);
        if let Some(p) = path {
            error = error.with_path(p);
        }
        error
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: message (path: /foo/bar)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            StorageErrorKind::NotFound => "Not found",
            StorageErrorKind::PermissionDenied => "Permission denied",
            StorageErrorKind::InvalidPath => "Invalid path",
            StorageErrorKind::InvalidData => "Invalid data",
            StorageErrorKind::Timeout => "Timeout",
            StorageErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }

        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Document store abstraction.
///
/// Provides the two primitives the content pipeline consumes: a recursive
/// listing of qualifying source documents, and a raw-content reader.
///
/// Traversal order of [`scan`](Self::scan) is unspecified and must not be
/// relied upon.
pub trait Storage: Send + Sync {
    /// Discover all source documents.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if any part of the traversal fails. A failed
    /// scan never yields a partial listing.
    fn scan(&self) -> Result<Vec<SourceRef>, StorageError>;

    /// Read the raw content of a discovered document.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the document doesn't exist or can't be read.
    fn read(&self, source: &SourceRef) -> Result<String, StorageError>;
}

/// Derive the slug for a document from its path relative to the store root.
///
/// The suffix is stripped only when the file name ends with it. Path
/// components are joined with `/` regardless of platform.
///
/// Returns `None` if nothing is left after stripping (e.g., a file named
/// exactly `.md`).
#[must_use]
pub fn slug_for(rel_path: &Path, suffix: &str) -> Option<String> {
    let parts: Vec<String> = rel_path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    let joined = parts.join("/");
    let stem = joined.strip_suffix(suffix).unwrap_or(&joined);
    if stem.is_empty() || stem.ends_with('/') {
        return None;
    }
    Some(format!("/{stem}"))
}
