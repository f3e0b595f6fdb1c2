//! Document conversion for braindump.
//!
//! The content pipeline treats conversion as an external collaborator: a pure
//! function from raw document text to publishable content, the outbound link
//! targets found in it, and its tags. This crate defines that boundary
//! ([`Converter`]) and ships the default [`MarkdownConverter`].
//!
//! # Example
//!
//! ```
//! use bd_convert::{Converter, MarkdownConverter};
//!
//! let result = MarkdownConverter::new()
//!     .convert("---\ntags: [nopub]\n---\n# Draft\n\nSee [rust](rust.md).")
//!     .unwrap();
//! assert_eq!(result.content.title.as_deref(), Some("Draft"));
//! assert_eq!(result.links, vec!["rust.md"]);
//! assert!(result.tags.is_unpublished());
//! ```

mod converter;
mod markdown;
mod tags;

pub use converter::{Content, Conversion, ConvertError, Converter};
pub use markdown::MarkdownConverter;
pub use tags::{NOPUB, Tag, Tags};
