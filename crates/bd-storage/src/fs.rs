//! Filesystem storage backend.
//!
//! [`FsStorage`] walks a root directory recursively and reports every file
//! whose name ends with the configured source suffix.
//!
//! Symbolic links are followed. Slugs come from the link's own location, not
//! its target. Broken links are skipped, and a directory link back into one of
//! its own ancestors is not descended into again.

use std::fs;
use std::path::{Path, PathBuf};

use crate::storage::{SourceRef, Storage, StorageError, StorageErrorKind, slug_for};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Create a storage error from an I/O error on `path`.
fn io_error(err: std::io::Error, path: &Path) -> StorageError {
    StorageError::io(err, Some(path.to_path_buf())).with_backend(BACKEND)
}

/// Default source document suffix.
pub const DEFAULT_SUFFIX: &str = ".md";

/// Filesystem storage implementation.
///
/// # Example
///
/// ```ignore
/// use std::path::PathBuf;
/// use bd_storage::{FsStorage, Storage};
///
/// let storage = FsStorage::new(PathBuf::from("_posts"));
/// for source in storage.scan()? {
///     println!("{} -> {}", source.slug, source.path.display());
/// }
/// ```
#[derive(Debug)]
pub struct FsStorage {
    /// Root directory of the document store.
    root: PathBuf,
    /// File name suffix identifying source documents (e.g., ".md").
    suffix: String,
}

impl FsStorage {
    /// Create a filesystem storage that picks up `.md` files.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self::with_suffix(root, DEFAULT_SUFFIX)
    }

    /// Create a filesystem storage with a custom source suffix.
    #[must_use]
    pub fn with_suffix(root: PathBuf, suffix: impl Into<String>) -> Self {
        Self {
            root,
            suffix: suffix.into(),
        }
    }

    /// Root directory of the store.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Source suffix used to select documents.
    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Walk `dir` and push a [`SourceRef`] for every qualifying file.
    ///
    /// Hidden entries (leading `.`) are skipped. Any I/O error aborts the walk.
    /// `ancestors` holds the resolved paths of `dir` and every directory above
    /// it, with `dir` last.
    fn scan_directory(
        &self,
        dir: &Path,
        ancestors: &mut Vec<PathBuf>,
        refs: &mut Vec<SourceRef>,
    ) -> Result<(), StorageError> {
        let entries = fs::read_dir(dir).map_err(|e| io_error(e, dir))?;

        for entry in entries {
            let entry = entry.map_err(|e| io_error(e, dir))?;
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if name.starts_with('.') {
                continue;
            }

            let path = entry.path();
            let mut file_type = entry.file_type().map_err(|e| io_error(e, &path))?;
            let is_link = file_type.is_symlink();
            if is_link {
                match fs::metadata(&path) {
                    Ok(metadata) => file_type = metadata.file_type(),
                    Err(e) => {
                        tracing::debug!(path = %path.display(), error = %e, "Skipping broken symlink");
                        continue;
                    }
                }
            }

            if file_type.is_dir() {
                let real = if is_link {
                    fs::canonicalize(&path).map_err(|e| io_error(e, &path))?
                } else {
                    match ancestors.last() {
                        Some(parent) => parent.join(entry.file_name()),
                        None => fs::canonicalize(&path).map_err(|e| io_error(e, &path))?,
                    }
                };
                if ancestors.contains(&real) {
                    tracing::debug!(path = %path.display(), resolved = %real.display(), "Skipping symlink cycle");
                    continue;
                }
                ancestors.push(real);
                self.scan_directory(&path, ancestors, refs)?;
                ancestors.pop();
            } else if name.ends_with(self.suffix.as_str()) {
                let rel = path.strip_prefix(&self.root).map_err(|_| {
                    StorageError::new(StorageErrorKind::InvalidPath)
                        .with_backend(BACKEND)
                        .with_path(&path)
                })?;
                let Some(slug) = slug_for(rel, &self.suffix) else {
                    continue;
                };
                refs.push(SourceRef { slug, path });
            }
        }

        Ok(())
    }
}

impl Storage for FsStorage {
    fn scan(&self) -> Result<Vec<SourceRef>, StorageError> {
        let root = fs::canonicalize(&self.root).map_err(|e| io_error(e, &self.root))?;
        let mut ancestors = vec![root];
        let mut refs = Vec::new();
        self.scan_directory(&self.root, &mut ancestors, &mut refs)?;
        tracing::debug!(
            root = %self.root.display(),
            document_count = refs.len(),
            "Storage scan completed"
        );
        Ok(refs)
    }

    fn read(&self, source: &SourceRef) -> Result<String, StorageError> {
        fs::read_to_string(&source.path).map_err(|e| io_error(e, &source.path))
    }
}
