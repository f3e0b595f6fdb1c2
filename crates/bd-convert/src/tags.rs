//! Document flags.
//!
//! Authors attach tags to documents (front matter `tags:`), most of which are
//! opaque labels. A small set is recognized and changes how the pipeline
//! treats the document; see [`Tag`].

use std::collections::BTreeSet;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

/// Authored spelling of [`Tag::NoPublish`].
pub const NOPUB: &str = "nopub";

/// A document tag.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tag {
    /// Document takes part in link resolution and backlinks but is never exposed.
    NoPublish,
    /// Any other tag, lowercased.
    Other(String),
}

impl Tag {
    /// Parse a single tag, normalizing case and surrounding whitespace.
    ///
    /// Returns `None` for blank input.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_lowercase();
        match normalized.as_str() {
            "" => None,
            NOPUB => Some(Self::NoPublish),
            _ => Some(Self::Other(normalized)),
        }
    }

    /// Authored spelling of the tag.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::NoPublish => NOPUB,
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Tag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Set of tags attached to a document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Tags(BTreeSet<Tag>);

impl Tags {
    /// Create an empty tag set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a tag line.
    ///
    /// Accepts org-style `:a:b:` lists as well as whitespace or comma
    /// separated words.
    #[must_use]
    pub fn parse_line(line: &str) -> Self {
        line.split([':', ',', ' ', '\t'])
            .filter_map(Tag::parse)
            .collect()
    }

    /// Add a tag.
    pub fn insert(&mut self, tag: Tag) {
        self.0.insert(tag);
    }

    /// Check whether a tag is present.
    #[must_use]
    pub fn contains(&self, tag: &Tag) -> bool {
        self.0.contains(tag)
    }

    /// True if the document must not be exposed.
    #[must_use]
    pub fn is_unpublished(&self) -> bool {
        self.contains(&Tag::NoPublish)
    }

    /// Iterate tags in order.
    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.0.iter()
    }

    /// Number of tags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if there are no tags.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Tag> for Tags {
    fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Tags {
    type Item = &'a Tag;
    type IntoIter = std::collections::btree_set::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromStr for Tags {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse_line(s))
    }
}
