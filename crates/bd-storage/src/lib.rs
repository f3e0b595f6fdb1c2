//! Document store abstraction for braindump.
//!
//! This crate provides a [`Storage`] trait that the content pipeline uses to
//! discover source documents and read their raw content. This enables:
//!
//! - **Unit testing** without touching the real filesystem
//! - **Clean separation** between corpus logic and I/O operations
//!
//! # Architecture
//!
//! The crate provides:
//! - [`Storage`] trait with `scan()` and `read()` methods
//! - [`FsStorage`] implementation walking a directory tree
//! - [`MockStorage`] for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use std::path::PathBuf;
//! use bd_storage::{FsStorage, Storage};
//!
//! let storage = FsStorage::new(PathBuf::from("_posts"));
//! for source in storage.scan()? {
//!     let raw = storage.read(&source)?;
//!     println!("{}: {} bytes", source.slug, raw.len());
//! }
//! ```

mod fs;
#[cfg(feature = "mock")]
mod mock;
mod storage;

pub use fs::{DEFAULT_SUFFIX, FsStorage};
#[cfg(feature = "mock")]
pub use mock::MockStorage;
pub use storage::{SourceRef, Storage, StorageError, StorageErrorKind, slug_for};
