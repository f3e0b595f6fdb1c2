//! Content pipeline for braindump.
//!
//! Turns a tree of source documents into a corpus of published pages with
//! backlinks:
//!
//! - [`Pipeline`]: scan, convert, resolve links, index backlinks
//! - [`Resolver`]: maps authored link targets to canonical slugs
//! - [`BacklinkIndex`]: reverse relation of outbound links
//! - [`publishable`]: hides documents tagged `nopub`
//! - [`Library`]: memoized, single-flight access to the published corpus
//!
//! Backlinks are always computed over the full corpus, unpublished documents
//! included; filtering only affects what queries return.

mod document;
mod filter;
mod indexer;
mod library;
mod pipeline;
mod resolver;

pub use document::{ConvertedDocument, Corpus, Document, ResolvedDocument};
pub use filter::publishable;
pub use indexer::{BacklinkIndex, index};
pub use library::{Library, Snapshot};
pub use pipeline::{FailurePolicy, Pipeline, PipelineError};
pub use resolver::Resolver;
